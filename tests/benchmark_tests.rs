//! Tick-loop and codec throughput under synthetic load, in the same spirit as (not
//! necessarily the same content as) a tight perf suite would check: not hard pass/fail
//! gates on absolute numbers, which vary wildly by machine, but sanity checks that the
//! core hot paths (simulation step, message codec) stay well under a tick budget even
//! at player counts far beyond anything one instance would realistically host.

use std::time::{Duration, Instant};

use shared::map::{MapDescriptor, Polygon};
use shared::message::{InputMask, Message, PlayerState};
use shared::player::Player;
use shared::simulation::step;
use shared::{message, PLAYER_SPEED, TICK_RATE};
use std::collections::HashMap;

fn benchmark_map() -> MapDescriptor {
    MapDescriptor::new(
        "bench",
        "Benchmark Arena",
        2000.0,
        2000.0,
        vec![
            Polygon::new(vec![(500.0, 500.0), (600.0, 500.0), (600.0, 600.0), (500.0, 600.0)]),
            Polygon::new(vec![(1000.0, 1000.0), (1100.0, 1000.0), (1100.0, 1100.0), (1000.0, 1100.0)]),
        ],
        vec![(100.0, 100.0)],
    )
}

/// One simulation step per player must be cheap enough that a single-threaded tick
/// loop can process thousands of them inside a 60 Hz budget (≈16.67ms) with plenty of
/// headroom left for I/O and broadcast.
#[test]
fn simulation_step_throughput_for_a_large_player_count() {
    let map = benchmark_map();
    let mut players: Vec<Player> = (0..2000)
        .map(|i| Player::new(format!("p{i}"), 100.0 + (i % 50) as f32, 100.0))
        .collect();

    let started = Instant::now();
    for player in &mut players {
        step(player, InputMask::RIGHT, 1.0 / TICK_RATE as f32, &map, PLAYER_SPEED);
    }
    let elapsed = started.elapsed();

    let tick_budget = Duration::from_secs_f64(1.0 / TICK_RATE as f64);
    assert!(
        elapsed < tick_budget,
        "2000 simulation steps took {elapsed:?}, which exceeds one tick's budget of {tick_budget:?}"
    );
}

/// Repeated ticks must not regress: stepping the same population 300 times (5 seconds
/// of simulated gameplay at 60 Hz) should scale roughly linearly, not blow up.
#[test]
fn repeated_ticks_scale_linearly_with_tick_count() {
    let map = benchmark_map();
    let mut players: Vec<Player> = (0..200)
        .map(|i| Player::new(format!("p{i}"), 100.0, 100.0 + i as f32))
        .collect();

    let started = Instant::now();
    for _ in 0..300 {
        for player in &mut players {
            step(player, InputMask::DOWN, 1.0 / TICK_RATE as f32, &map, PLAYER_SPEED);
        }
    }
    let elapsed = started.elapsed();

    assert!(
        elapsed < Duration::from_secs(1),
        "300 ticks over 200 players took {elapsed:?}, expected comfortably under 1s"
    );
}

/// Encoding a full `game_update` snapshot for a large roster must stay cheap: this is
/// the per-tick, per-instance cost paid once regardless of player count (broadcast
/// fan-out reuses the same encoded line for every recipient in spirit, even though the
/// current implementation re-sends per connection).
#[test]
fn snapshot_encode_throughput_for_a_large_roster() {
    let mut players = HashMap::new();
    for i in 0..500 {
        players.insert(
            format!("p{i}"),
            PlayerState {
                id: format!("p{i}"),
                x: 100.0 + i as f32,
                y: 200.0,
                health: 100,
                max_health: 100,
                alive: true,
                last_input_seq: i as i64,
            },
        );
    }
    let snapshot = Message::GameUpdate { timestamp: 12345.0, players };

    let started = Instant::now();
    for _ in 0..1000 {
        let _line = message::encode(&snapshot).unwrap();
    }
    let elapsed = started.elapsed();

    assert!(
        elapsed < Duration::from_millis(500),
        "1000 encodes of a 500-player snapshot took {elapsed:?}"
    );
}

/// Decoding must be similarly cheap since it runs once per inbound line on every
/// connection's read loop.
#[test]
fn input_decode_throughput() {
    let line = message::encode(&Message::In { seq: 1, k: InputMask::UP | InputMask::RIGHT, dt: 1.0 / 60.0, ack: None })
        .unwrap();

    let started = Instant::now();
    for _ in 0..100_000 {
        let _ = message::decode(&line).unwrap();
    }
    let elapsed = started.elapsed();

    assert!(
        elapsed < Duration::from_secs(1),
        "100k decodes of an `in` message took {elapsed:?}"
    );
}
