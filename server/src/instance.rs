//! Game Instance: one per active map. Owns its players, a FIFO pending-input queue per
//! player, and runs the fixed-tick loop that applies inputs, advances the simulation,
//! and broadcasts snapshots. Modeled as a single spawned task with its own command
//! channel — the "single owning coordinator" the design notes call for, generalized
//! from a shared mutable registry into an actor with no locking inside it at all.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use shared::map::MapDescriptor;
use shared::message::{InputMask, PlayerState};
use shared::{Message, Player};
use tokio::sync::{mpsc, oneshot};
use tokio::time;

/// Per-tick cap on how many queued inputs one player's turn may drain (§9): a flooding
/// client can fill its own queue but never monopolize a tick at every other player's
/// expense. Inputs left over after the cap simply wait for the next tick.
const MAX_INPUTS_PER_TICK: usize = 32;

const STATS_INTERVAL: Duration = Duration::from_secs(5);

struct PendingInput {
    seq: u32,
    k: InputMask,
}

/// What a successful `join` hands back to the caller: `map_data` and `game_state` have
/// already been sent to the joining client's own channel by the time this resolves, so
/// these fields exist for callers that need the same data without re-reading the wire
/// (router bookkeeping, tests) rather than for forwarding.
pub struct JoinAck {
    pub map: MapDescriptor,
    pub your_player: PlayerState,
    pub players: HashMap<String, PlayerState>,
}

enum Command {
    Join {
        client_id: String,
        outbound: mpsc::UnboundedSender<Message>,
        reply: oneshot::Sender<JoinAck>,
    },
    Input {
        client_id: String,
        seq: u32,
        k: InputMask,
        dt: f32,
    },
    Leave {
        client_id: String,
    },
    Chat {
        from: String,
        text: String,
    },
    Stop,
}

/// A cheap, cloneable reference to a running instance's command channel.
#[derive(Clone)]
pub struct InstanceHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl InstanceHandle {
    /// Adds `client_id` as a new player. `map_data` and `game_state` are sent to
    /// `outbound` before it is registered as a broadcast member, so the resolved future
    /// guarantees the client has both in hand before any `game_update` can reach it.
    /// Returns `None` if the instance has already stopped.
    pub async fn join(
        &self,
        client_id: String,
        outbound: mpsc::UnboundedSender<Message>,
    ) -> Option<JoinAck> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Command::Join {
                client_id,
                outbound,
                reply: reply_tx,
            })
            .ok()?;
        reply_rx.await.ok()
    }

    /// Enqueues one input for FIFO processing at the next tick boundary.
    pub fn input(&self, client_id: String, seq: u32, k: InputMask, dt: f32) {
        let _ = self.tx.send(Command::Input {
            client_id,
            seq,
            k,
            dt,
        });
    }

    /// Removes a player and broadcasts `player_left` to the remaining members.
    pub fn leave(&self, client_id: String) {
        let _ = self.tx.send(Command::Leave { client_id });
    }

    pub fn chat(&self, from: String, text: String) {
        let _ = self.tx.send(Command::Chat { from, text });
    }

    /// Signals the tick loop to exit at its next select iteration.
    pub fn stop(&self) {
        let _ = self.tx.send(Command::Stop);
    }
}

#[derive(Default)]
struct Stats {
    ticks: u64,
    total_dt: f64,
    max_dt: f64,
    inputs_processed: u64,
    messages_sent: u64,
}

struct State {
    map: MapDescriptor,
    player_speed: f32,
    players: HashMap<String, Player>,
    members: HashMap<String, mpsc::UnboundedSender<Message>>,
    pending: HashMap<String, VecDeque<PendingInput>>,
    stats: Stats,
}

fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

impl State {
    fn snapshot_of(&self, player: &Player) -> PlayerState {
        PlayerState {
            id: player.id.clone(),
            x: player.x,
            y: player.y,
            health: player.life.current(),
            max_health: player.life.max(),
            alive: player.life.alive(),
            last_input_seq: player.last_input_seq,
        }
    }

    fn all_snapshots(&self) -> HashMap<String, PlayerState> {
        self.players
            .iter()
            .map(|(id, p)| (id.clone(), self.snapshot_of(p)))
            .collect()
    }

    fn broadcast(&mut self, message: Message) {
        for sender in self.members.values() {
            if sender.send(message.clone()).is_ok() {
                self.stats.messages_sent += 1;
            }
        }
    }

    fn broadcast_except(&mut self, exclude: &str, message: Message) {
        for (id, sender) in &self.members {
            if id != exclude && sender.send(message.clone()).is_ok() {
                self.stats.messages_sent += 1;
            }
        }
    }

    fn handle_join(&mut self, client_id: String, outbound: mpsc::UnboundedSender<Message>) -> JoinAck {
        let spawn_index = self.players.len();
        let (sx, sy) = self.map.spawn_point_for(spawn_index);
        let player = Player::new(client_id.clone(), sx, sy);
        let your_player = self.snapshot_of(&player);

        self.players.insert(client_id.clone(), player);
        self.pending.insert(client_id.clone(), VecDeque::new());

        let players = self.all_snapshots();

        // Sent on the joining client's own channel before it is registered as a
        // broadcast member, so a tick's game_update can never land ahead of the
        // handshake it's still waiting on (§4.1).
        let _ = outbound.send(Message::MapData {
            map: shared::message::MapPayload::from(&self.map),
        });
        let _ = outbound.send(Message::GameState {
            your_player: your_player.clone(),
            players: players.clone(),
        });

        self.members.insert(client_id.clone(), outbound);
        self.broadcast_except(
            &client_id,
            Message::PlayerJoined {
                player: your_player.clone(),
            },
        );

        JoinAck {
            map: self.map.clone(),
            your_player,
            players,
        }
    }

    fn handle_leave(&mut self, client_id: &str) {
        self.players.remove(client_id);
        self.pending.remove(client_id);
        self.members.remove(client_id);
        self.broadcast(Message::PlayerLeft {
            player_id: client_id.to_string(),
        });
    }

    fn handle_input(&mut self, client_id: &str, seq: u32, k: InputMask, _dt: f32) {
        // dt is advisory per the protocol (§3); the tick loop always integrates by
        // TICK_INTERVAL, never by the client-reported value.
        if let Some(queue) = self.pending.get_mut(client_id) {
            queue.push_back(PendingInput { seq, k });
        }
    }

    fn handle_chat(&mut self, from: String, text: String) {
        self.broadcast_except(
            &from,
            Message::Chat {
                from: Some(from.clone()),
                text,
            },
        );
    }

    fn tick(&mut self, tick_interval_secs: f32) {
        let ids: Vec<String> = self.players.keys().cloned().collect();
        let mut inputs_this_tick = 0u64;

        for id in ids {
            for _ in 0..MAX_INPUTS_PER_TICK {
                let input = match self.pending.get_mut(&id).and_then(VecDeque::pop_front) {
                    Some(input) => input,
                    None => break,
                };
                if let Some(player) = self.players.get_mut(&id) {
                    shared::simulation::step(
                        player,
                        input.k,
                        tick_interval_secs,
                        &self.map,
                        self.player_speed,
                    );
                    player.observe_input_seq(input.seq as i64);
                }
                inputs_this_tick += 1;
            }
        }
        self.stats.inputs_processed += inputs_this_tick;

        if !self.players.is_empty() {
            let players = self.all_snapshots();
            self.broadcast(Message::GameUpdate {
                timestamp: now_secs(),
                players,
            });
        }
    }
}

/// Spawns a new instance task for `map` and returns a handle to it. The instance keeps
/// running — even with zero players — until [`InstanceHandle::stop`] is called or every
/// handle to its command channel is dropped.
pub fn spawn(map: MapDescriptor, player_speed: f32, tick_interval: Duration) -> InstanceHandle {
    let (tx, mut rx) = mpsc::unbounded_channel::<Command>();
    let map_id = map.id.clone();

    tokio::spawn(async move {
        let mut state = State {
            map,
            player_speed,
            players: HashMap::new(),
            members: HashMap::new(),
            pending: HashMap::new(),
            stats: Stats::default(),
        };

        let mut ticker = time::interval(tick_interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
        let tick_secs = tick_interval.as_secs_f32();
        let mut last_stats_log = Instant::now();

        loop {
            tokio::select! {
                command = rx.recv() => {
                    match command {
                        Some(Command::Join { client_id, outbound, reply }) => {
                            let ack = state.handle_join(client_id, outbound);
                            let _ = reply.send(ack);
                        }
                        Some(Command::Input { client_id, seq, k, dt }) => {
                            state.handle_input(&client_id, seq, k, dt);
                        }
                        Some(Command::Leave { client_id }) => state.handle_leave(&client_id),
                        Some(Command::Chat { from, text }) => state.handle_chat(from, text),
                        Some(Command::Stop) | None => break,
                    }
                }
                _ = ticker.tick() => {
                    let started = Instant::now();
                    state.tick(tick_secs);
                    state.stats.ticks += 1;
                    let elapsed = started.elapsed().as_secs_f64();
                    state.stats.total_dt += elapsed;
                    state.stats.max_dt = state.stats.max_dt.max(elapsed);

                    if last_stats_log.elapsed() >= STATS_INTERVAL {
                        let avg_dt_ms = if state.stats.ticks > 0 {
                            (state.stats.total_dt / state.stats.ticks as f64) * 1000.0
                        } else {
                            0.0
                        };
                        log::info!(
                            "instance {} stats: ticks={} avg_dt={:.3}ms max_dt={:.3}ms inputs_processed={} messages_sent={}",
                            map_id,
                            state.stats.ticks,
                            avg_dt_ms,
                            state.stats.max_dt * 1000.0,
                            state.stats.inputs_processed,
                            state.stats.messages_sent,
                        );
                        state.stats = Stats::default();
                        last_stats_log = Instant::now();
                    }
                }
            }
        }
        log::info!("instance {map_id} stopped");
    });

    InstanceHandle { tx }
}
