//! Client application entry point.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use clap::Parser;
use log::{info, warn};

use client::controller::LocalController;
use client::input::{InputSource, NoInput, SendGate};
use client::network::Connection;
use client::remote_view::RemoteView;
use client::rendering::{LoggingRenderer, Renderer};
use shared::map::MapDescriptor;
use shared::message::Message;

const FRAME_HZ: f32 = 60.0;
const SEND_HZ: f32 = 30.0;

/// `client [--server host:port] [--map id]`.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Server address in "host:port" form.
    #[arg(short, long, default_value = "127.0.0.1:9000")]
    server: String,

    /// Map id to request on join; falls back to the server's default if omitted or
    /// unknown.
    #[arg(short, long)]
    map: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    info!("connecting to {}", args.server);

    let mut conn = Connection::connect(&args.server).await?;

    let your_id = match conn.recv().await {
        Some(Message::Welcome { your_id, .. }) => your_id,
        other => return Err(format!("expected welcome, got {other:?}").into()),
    };
    info!("connected as {your_id}");

    conn.send(&Message::Join { map: args.map }).await?;

    let map = match conn.recv().await {
        Some(Message::MapData { map }) => {
            let (width, height) = map.size;
            MapDescriptor::new(map.id, map.name, width, height, map.objects, vec![(0.0, 0.0)])
        }
        other => return Err(format!("expected map_data, got {other:?}").into()),
    };

    let (mut controller, mut remotes) = match conn.recv().await {
        Some(Message::GameState { your_player, players }) => {
            let controller = LocalController::new(
                your_player.x,
                your_player.y,
                your_player.health,
                your_player.max_health,
            );
            let remotes: HashMap<String, RemoteView> = players
                .into_iter()
                .filter(|(id, _)| *id != your_id)
                .map(|(id, p)| (id, RemoteView::new(p.x, p.y, p.health, p.max_health, p.alive)))
                .collect();
            (controller, remotes)
        }
        other => return Err(format!("expected game_state, got {other:?}").into()),
    };

    let mut input_source: Box<dyn InputSource> = Box::new(NoInput);
    let mut renderer: Box<dyn Renderer> = Box::new(LoggingRenderer::default());
    let mut send_gate = SendGate::new(SEND_HZ);

    let mut frame_timer = tokio::time::interval(Duration::from_secs_f32(1.0 / FRAME_HZ));
    let mut last_frame = Instant::now();

    loop {
        tokio::select! {
            _ = frame_timer.tick() => {
                let now = Instant::now();
                let frame_dt = now.duration_since(last_frame).as_secs_f32();
                last_frame = now;

                let k = input_source.sample();
                let seq = controller.predict(k, &map);
                if send_gate.should_send(k, now) {
                    let _ = conn.send(&Message::In { seq, k, dt: frame_dt, ack: None }).await;
                }

                while let Some(message) = conn.try_recv() {
                    handle_message(message, &your_id, &mut controller, &mut remotes, &map);
                }

                controller.smooth(frame_dt);
                for view in remotes.values_mut() {
                    view.tick(frame_dt);
                }

                renderer.draw_map(&map);
                renderer.draw_local_player(controller.render_pos, controller.health, controller.max_health);
                for (id, view) in &remotes {
                    renderer.draw_remote_player(id, view);
                }
                renderer.present();
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
        }
    }

    Ok(())
}

fn handle_message(
    message: Message,
    your_id: &str,
    controller: &mut LocalController,
    remotes: &mut HashMap<String, RemoteView>,
    map: &MapDescriptor,
) {
    match message {
        Message::GameUpdate { players, .. } => {
            for (id, state) in players {
                if id == your_id {
                    controller.reconcile(state.x, state.y, state.last_input_seq, map);
                    controller.set_health(state.health, state.max_health, state.alive);
                } else {
                    remotes
                        .entry(id)
                        .or_insert_with(|| RemoteView::new(state.x, state.y, state.health, state.max_health, state.alive))
                        .update_from_server(state.x, state.y, state.health, state.max_health, state.alive);
                }
            }
        }
        // Only the initial handshake constructs a `LocalController` from `game_state`
        // directly; this arm exists so a later one (a server-initiated resync) snaps
        // the same way instead of silently falling through the catch-all below.
        Message::GameState { your_player, players } => {
            controller.apply_full_state(your_player.x, your_player.y);
            controller.set_health(your_player.health, your_player.max_health, your_player.alive);
            for (id, state) in players {
                if id != your_id {
                    remotes
                        .entry(id)
                        .or_insert_with(|| RemoteView::new(state.x, state.y, state.health, state.max_health, state.alive))
                        .update_from_server(state.x, state.y, state.health, state.max_health, state.alive);
                }
            }
        }
        Message::PlayerJoined { player } => {
            if player.id != your_id {
                remotes.insert(
                    player.id,
                    RemoteView::new(player.x, player.y, player.health, player.max_health, player.alive),
                );
            }
        }
        Message::PlayerLeft { player_id } => {
            remotes.remove(&player_id);
        }
        Message::Chat { from, text } => {
            info!("chat [{}]: {text}", from.as_deref().unwrap_or("server"));
        }
        Message::Error { reason } => warn!("server error: {reason}"),
        Message::Unknown => {}
        _ => {}
    }
}
