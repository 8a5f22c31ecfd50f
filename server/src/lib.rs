//! # Game Server Library
//!
//! This library provides the authoritative server implementation for the networked
//! multiplayer game. It manages the canonical game state, processes client inputs,
//! and broadcasts updates to maintain synchronization across all connected clients.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Simulation
//! The server runs the definitive version of the game physics and state. All
//! game logic decisions are made here, with clients receiving and conforming
//! to the server's authoritative state updates.
//!
//! ### Client Management
//! Handles the complete lifecycle of client connections including:
//! - Connection establishment and player assignment
//! - Input queue management and processing
//! - Disconnection handling and cleanup
//!
//! ### State Broadcasting
//! Regularly transmits the current game state to all connected clients,
//! enabling them to stay synchronized and perform reconciliation when
//! their predictions diverge from reality.
//!
//! ## Architecture Design
//!
//! ### One Task Per Connection, One Task Per Instance
//! Each accepted TCP connection runs as its own task, reading newline-delimited
//! JSON and draining a dedicated outbound channel back to the socket. Each active
//! map runs as its own task too, owning its players and ticking independently —
//! there is no shared, lockable game state; instances only exchange messages.
//!
//! ### TCP + Newline-Delimited JSON
//! Uses TCP for reliable, ordered delivery and a tagged JSON message for every
//! line, trading some bandwidth efficiency against a binary protocol for a wire
//! format that is trivial to log, replay, and debug.
//!
//! ### Input Processing Pipeline
//! Client inputs are queued per player in arrival order and drained by the
//! owning instance's tick loop, up to a per-tick cap, so no single player's
//! flood of inputs can starve the others in the same tick.
//!
//! ## Module Organization
//!
//! ### Config Module (`config`)
//! CLI argument parsing and the runtime [`Config`](config::Config) it produces.
//!
//! ### Error Module (`error`)
//! The typed error taxonomy ([`ProtocolError`](error::ProtocolError),
//! [`ConnectionError`](error::ConnectionError)) used throughout the crate in
//! place of a single catch-all error type.
//!
//! ### Map Catalog Module (`map_catalog`)
//! Loads maps at startup behind the [`MapSource`](map_catalog::MapSource) seam
//! and resolves join requests to a concrete map.
//!
//! ### Registry Module (`registry`)
//! The process-wide client id → outbound channel mapping.
//!
//! ### Instance Module (`instance`)
//! The per-map [`GameInstance`](instance) actor: tick loop, FIFO input queues,
//! deterministic spawn assignment, and snapshot broadcast.
//!
//! ### Router Module (`router`)
//! Dispatches one decoded message to the registry, an instance, or straight
//! back to the sender.
//!
//! ### Connection Module (`connection`)
//! Drives one accepted socket end to end: read loop, write loop, and the
//! once-only cleanup path on disconnect.
//!
//! ## Performance Characteristics
//!
//! ### Tick Rate
//! Each instance runs at a fixed tick rate (60Hz by default) to ensure
//! consistent simulation timing. Every tick drains pending inputs and
//! broadcasts a new snapshot to its members.
//!
//! ### Scalability
//! Designed to handle multiple concurrent instances, each with a handful of
//! players. Because instances never share mutable state, adding instances
//! adds tasks rather than lock contention.
//!
//! ## Security Considerations
//!
//! ### Input Validation
//! All client inputs are decoded through the tagged wire protocol before
//! application; anything that fails to decode or arrives out of turn (e.g.
//! input before `join`) is logged and discarded rather than applied.
//!
//! ### Line Length Limits
//! A connection that sends a single line longer than
//! [`shared::MAX_LINE_BYTES`] is closed rather than allowed to grow its read
//! buffer without bound.
//!
//! ### State Authority
//! The server maintains absolute authority over game state; clients receive
//! snapshots but never submit state directly, only inputs.

pub mod config;
pub mod connection;
pub mod error;
pub mod instance;
pub mod map_catalog;
pub mod registry;
pub mod router;
