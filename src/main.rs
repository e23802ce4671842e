//! Quest Trading Engine Simulation.
//!
//! Demonstrates the full paper-trading lifecycle including registration,
//! leveraged positions, liquidations, XP awards, streaks, and level-gated
//! leverage unlocks.

use quest_core::*;
use rust_decimal_macros::dec;

fn main() {
    println!("Quest Trading Engine Simulation");
    println!("Practice Balances, Progression-Gated Leverage, Full Lifecycle\n");

    scenario_1_first_trades();
    scenario_2_leverage_caps();
    scenario_3_owner_close_vs_liquidation();
    scenario_4_streak_building();
    scenario_5_grinding_to_a_level_up();
    scenario_6_atomicity_probes();
    scenario_7_snapshot_and_migration();

    println!("\nAll simulations completed successfully.");
}

fn fx(value: rust_decimal::Decimal) -> Fixed {
    Fixed::new(value).unwrap()
}

/// Registration, a first winning trade, and the XP it earns.
fn scenario_1_first_trades() {
    println!("Scenario 1: Registration and First Trades\n");

    let mut engine = Engine::new(EngineConfig::default());
    engine.add_pair(TradingPair::btc_usd()).unwrap();
    engine.update_pair_price(PairId(1), Fixed::from_int(100)).unwrap();

    let alice = UserId(1);
    let bob = UserId(2);
    engine.register_user(alice).unwrap();
    engine.register_user(bob).unwrap();

    println!("  Alice and Bob register with $10,000 practice balances");
    println!("  BTC-USD listed at $100\n");

    let opened = engine
        .open_position(alice, PairId(1), Side::Long, 10, Fixed::from_int(1_000))
        .unwrap();
    println!(
        "  Alice opens LONG 10x with $1,000, entry ${}, liquidation at ${}",
        opened.entry_price, opened.liquidation_price
    );

    engine.update_pair_price(PairId(1), Fixed::from_int(105)).unwrap();
    let closed = engine.close_position(alice, opened.position_id).unwrap();
    println!(
        "  Price rises to $105, Alice closes: profit ${} after ${} fee",
        closed.net_amount, closed.fee
    );

    let user = engine.get_user(alice).unwrap();
    println!(
        "  Balance: ${}, XP: {}, level: {}, streak: {} day(s)",
        user.practice_balance, user.total_xp, user.level, user.streak_days
    );
    if let Some(rate) = user.win_rate() {
        println!("  Win rate: {}% over {} trade(s)\n", rate * dec!(100), user.total_trades);
    }
}

/// Leverage requests bounded by user level, pair cap, and system ceiling.
fn scenario_2_leverage_caps() {
    println!("Scenario 2: Leverage Caps\n");

    let mut engine = Engine::new(EngineConfig::default());
    engine.add_pair(TradingPair::btc_usd()).unwrap();
    engine
        .add_pair(TradingPair::new(PairId(7), "DOGE-USD", Leverage::new_unchecked(5)))
        .unwrap();
    engine.update_pair_price(PairId(1), Fixed::from_int(100)).unwrap();
    engine.update_pair_price(PairId(7), fx(dec!(0.25))).unwrap();

    let alice = UserId(1);
    engine.register_user(alice).unwrap();
    let cap = engine.get_user(alice).unwrap().max_leverage;
    println!("  Alice is level 1, unlocked cap: {cap}");

    let err = engine
        .open_position(alice, PairId(1), Side::Long, 11, Fixed::from_int(100))
        .unwrap_err();
    println!("  Requesting 11x on BTC-USD: {err}");

    let err = engine
        .open_position(alice, PairId(7), Side::Long, 7, Fixed::from_int(100))
        .unwrap_err();
    println!("  Requesting 7x on DOGE-USD: {err}");

    let opened = engine
        .open_position(alice, PairId(1), Side::Long, 10, Fixed::from_int(100))
        .unwrap();
    println!("  Requesting 10x on BTC-USD: accepted, position {:?}\n", opened.position_id.0);
}

/// A voluntary losing close against a forced liquidation, with prices
/// arriving through the feed seam.
fn scenario_3_owner_close_vs_liquidation() {
    println!("Scenario 3: Owner Close vs Liquidation\n");

    let mut engine = Engine::new(EngineConfig::default());
    engine.add_pair(TradingPair::btc_usd()).unwrap();

    let mut feed = MockPriceFeed::new();
    feed.set_price(PairId(1), Fixed::from_int(100));
    engine
        .update_pair_price(PairId(1), feed.current_price(PairId(1)).unwrap())
        .unwrap();

    let alice = UserId(1);
    engine.register_user(alice).unwrap();

    let first = engine
        .open_position(alice, PairId(1), Side::Long, 10, Fixed::from_int(1_000))
        .unwrap();
    println!(
        "  LONG 10x with $1,000 @ $100, liquidation at ${}",
        first.liquidation_price
    );

    // a 0.05% dip stays above the 99.905 level
    let dipped = feed.drift(PairId(1), dec!(-0.05)).unwrap();
    engine.update_pair_price(PairId(1), dipped).unwrap();
    let closed = engine.close_position(alice, first.position_id).unwrap();
    println!(
        "  Feed drifts to ${dipped}: {:?} close, loss ${}",
        closed.reason, closed.net_amount
    );

    let second = engine
        .open_position(alice, PairId(1), Side::Long, 10, Fixed::from_int(1_000))
        .unwrap();
    let crashed = feed.drift(PairId(1), dec!(-0.1)).unwrap();
    engine.update_pair_price(PairId(1), crashed).unwrap();
    let closed = engine.close_position(alice, second.position_id).unwrap();
    println!(
        "  Feed drifts to ${crashed}, through the ${} level: {:?}, collateral ${} forfeited",
        second.liquidation_price, closed.reason, closed.net_amount
    );

    let user = engine.get_user(alice).unwrap();
    println!("  Balance after both: ${}\n", user.practice_balance);
}

/// Daily activity extends a streak; a long gap resets it.
fn scenario_4_streak_building() {
    println!("Scenario 4: Streak Building\n");

    let mut engine = Engine::new(EngineConfig::default());
    engine.add_pair(TradingPair::btc_usd()).unwrap();
    engine.update_pair_price(PairId(1), Fixed::from_int(100)).unwrap();

    let alice = UserId(1);
    engine.register_user(alice).unwrap();

    for day in 1..=5 {
        engine.advance_time(DAY_MS);
        let opened = engine
            .open_position(alice, PairId(1), Side::Long, 2, Fixed::from_int(100))
            .unwrap();
        engine.close_position(alice, opened.position_id).unwrap();

        let user = engine.get_user(alice).unwrap();
        println!(
            "  Day {day}: streak {} day(s), total XP {}",
            user.streak_days, user.total_xp
        );
    }

    println!("  ... Alice goes quiet for 3 days ...");
    engine.advance_time(3 * DAY_MS);
    let opened = engine
        .open_position(alice, PairId(1), Side::Long, 2, Fixed::from_int(100))
        .unwrap();
    engine.close_position(alice, opened.position_id).unwrap();

    let user = engine.get_user(alice).unwrap();
    println!(
        "  Back again: streak reset to {} day(s), total XP {}\n",
        user.streak_days, user.total_xp
    );
}

/// Grinding flat trades until a level unlocks more leverage.
fn scenario_5_grinding_to_a_level_up() {
    println!("Scenario 5: Grinding to a Level-Up\n");

    let mut engine = Engine::new(EngineConfig::default());
    engine.add_pair(TradingPair::btc_usd()).unwrap();
    engine.update_pair_price(PairId(1), Fixed::from_int(100)).unwrap();

    let alice = UserId(1);
    engine.register_user(alice).unwrap();
    println!("  Alice starts at level 1 with a 10x cap");

    let mut trades = 0;
    while engine.get_user(alice).unwrap().level < 5 {
        let opened = engine
            .open_position(alice, PairId(1), Side::Long, 2, Fixed::from_int(100))
            .unwrap();
        let closed = engine.close_position(alice, opened.position_id).unwrap();
        trades += 1;

        if closed.award.leveled_up() {
            println!(
                "  Trade {trades}: level {} -> {}, cap now {}",
                closed.award.old_level,
                closed.award.new_level,
                closed.award.new_max_leverage
            );
        }
    }

    let user = engine.get_user(alice).unwrap();
    println!(
        "  After {trades} flat trades: level {}, {} XP, balance still ${}",
        user.level, user.total_xp, user.practice_balance
    );

    let opened = engine
        .open_position(alice, PairId(1), Side::Long, 15, Fixed::from_int(100))
        .unwrap();
    println!(
        "  15x now accepted, liquidation at ${}\n",
        opened.liquidation_price
    );
}

/// Failed operations leave the engine byte-identical.
fn scenario_6_atomicity_probes() {
    println!("Scenario 6: Atomicity Probes\n");

    let mut engine = Engine::new(EngineConfig::default());
    engine.add_pair(TradingPair::btc_usd()).unwrap();
    engine.update_pair_price(PairId(1), Fixed::from_int(100)).unwrap();

    let alice = UserId(1);
    let mallory = UserId(66);
    engine.register_user(alice).unwrap();
    engine.register_user(mallory).unwrap();
    let opened = engine
        .open_position(alice, PairId(1), Side::Long, 5, Fixed::from_int(500))
        .unwrap();

    let before = engine.snapshot();
    let events_before = engine.events().len();

    let probes: [(&str, EngineError); 3] = [
        (
            "oversized open",
            engine
                .open_position(alice, PairId(1), Side::Long, 5, Fixed::from_int(99_999))
                .unwrap_err(),
        ),
        (
            "duplicate registration",
            engine.register_user(alice).unwrap_err(),
        ),
        (
            "closing someone else's position",
            engine.close_position(mallory, opened.position_id).unwrap_err(),
        ),
    ];

    for (label, err) in &probes {
        println!("  {label}: {err}");
    }

    assert_eq!(engine.snapshot(), before);
    assert_eq!(engine.events().len(), events_before);
    println!("  State and event log unchanged after {} failed calls\n", probes.len());
}

/// Snapshot round-trip plus a v1 record upgraded on the way in.
fn scenario_7_snapshot_and_migration() {
    println!("Scenario 7: Snapshots and Migration\n");

    let mut engine = Engine::new(EngineConfig::default());
    engine.add_pair(TradingPair::btc_usd()).unwrap();
    engine.update_pair_price(PairId(1), Fixed::from_int(100)).unwrap();
    engine.register_user(UserId(1)).unwrap();
    engine
        .open_position(UserId(1), PairId(1), Side::Long, 10, Fixed::from_int(1_000))
        .unwrap();

    let snapshot = engine.snapshot();
    println!(
        "  Captured schema v{} snapshot: {} user(s), {} pair(s), {} position(s)",
        snapshot.schema_version,
        snapshot.users.len(),
        snapshot.pairs.len(),
        snapshot.positions.len()
    );

    let restored = Engine::restore(snapshot.clone(), EngineConfig::default()).unwrap();
    assert_eq!(restored.snapshot(), snapshot);
    println!("  Restored engine snapshots back byte-identical");

    // a record written before trade counters existed
    let legacy = snapshot::v1::EngineSnapshotV1 {
        schema_version: 1,
        users: vec![snapshot::v1::UserRecordV1 {
            id: UserId(9),
            total_xp: 1_014,
            level: 5,
            streak_days: 4,
            last_activity_time: Timestamp::from_millis(0),
            max_leverage: Leverage::new_unchecked(20),
            practice_balance: Fixed::from_int(8_000),
        }],
        pairs: vec![TradingPair::btc_usd()],
        positions: vec![],
        next_position_id: 1,
        next_event_id: 1,
        current_time: Timestamp::from_millis(0),
    };

    let migrated = snapshot::migrate_v1(legacy);
    let engine = Engine::restore(migrated, EngineConfig::default()).unwrap();
    let user = engine.get_user(UserId(9)).unwrap();
    println!(
        "  v1 record migrated: level {} kept, trade counters start at {}/{}",
        user.level, user.profitable_trades, user.total_trades
    );
}
