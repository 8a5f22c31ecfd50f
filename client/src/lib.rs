//! # Game Client Library
//!
//! This library provides the client-side netcode core for the networked multiplayer
//! game: input capture, the network connection, local prediction/reconciliation, and
//! remote-entity interpolation. Rendering and real input capture are external
//! collaborators specified only as trait contracts (§6) — this crate drives them, it
//! does not implement a windowing backend.
//!
//! ## Architecture Overview
//!
//! ### Client-Side Prediction
//! The client maintains a local copy of the game state and applies player inputs
//! immediately without waiting for server confirmation. This eliminates the
//! perceived input lag that would otherwise make the game feel unresponsive.
//!
//! ### Server Reconciliation
//! When authoritative snapshots arrive, the client accumulates the difference from
//! its prediction into a correction vector and drains it over several frames instead
//! of snapping, so a correction never appears as a visible jump.
//!
//! ### Remote Interpolation
//! Other players are rendered by chasing a `target` position set from each snapshot,
//! moving `current` toward it at a fixed speed every frame.
//!
//! ## Module Organization
//!
//! ### Controller Module (`controller`)
//! [`controller::LocalController`]: prediction, reconciliation, and the
//! accumulate-and-drain correction used to keep that convergence visually smooth.
//!
//! ### Remote View Module (`remote_view`)
//! [`remote_view::RemoteView`]: target-chasing interpolation for every other player.
//!
//! ### Input Module (`input`)
//! The [`input::InputSource`] collaborator trait, headless/scripted stand-ins, and
//! [`input::SendGate`], which decides when a sampled input is worth transmitting.
//!
//! ### Network Module (`network`)
//! [`network::Connection`]: the TCP connection, its dedicated reader task, and the
//! non-blocking queue the main loop drains every frame.
//!
//! ### Rendering Module (`rendering`)
//! The [`rendering::Renderer`] collaborator trait and a logging stand-in.
//!
//! ## Design Philosophy
//!
//! ### Responsiveness First
//! Every design decision prioritizes immediate visual feedback to player actions.
//! The client never waits for server confirmation before showing the results
//! of player input, creating a responsive and engaging experience.
//!
//! ### Deterministic Simulation
//! The client runs the exact same [`shared::simulation::step`] the server does, using
//! identical constants and inputs. This is what makes prediction converge with
//! authority instead of merely approximating it.

pub mod controller;
pub mod input;
pub mod network;
pub mod remote_view;
pub mod rendering;
