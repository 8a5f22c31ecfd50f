//! Per-client connection task: owns the socket, splits it into a line-oriented reader
//! and a writer draining this client's outbound channel, and decodes/routes every line
//! through the shared [`Router`]. One task per accepted connection; nothing here is
//! shared with any other connection except through `Router`.

use std::sync::Arc;

use shared::message::{self, Message};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

use crate::error::ProtocolError;
use crate::instance::InstanceHandle;
use crate::router::Router;

/// Drives one accepted connection until it closes, then runs cleanup exactly once.
pub async fn run(socket: TcpStream, router: Router) {
    if let Err(e) = socket.set_nodelay(true) {
        log::warn!("failed to set TCP_NODELAY: {e}");
    }
    let peer = socket
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    let (read_half, mut write_half) = socket.into_split();
    let mut reader = BufReader::new(read_half);

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();
    // A `pong` must reach the wire before anything already queued on `outbound_tx`
    // (§2b), so it travels on its own channel that the writer task always drains first.
    let (priority_tx, mut priority_rx) = mpsc::unbounded_channel::<Message>();
    let client_id = router.register(outbound_tx.clone()).await;
    log::info!("client {client_id} connected from {peer}");

    let available_maps = router.list_maps();
    let welcome = match available_maps {
        Message::MapsList { maps } => Message::Welcome {
            your_id: client_id.clone(),
            available_maps: maps,
        },
        _ => unreachable!("list_maps always returns MapsList"),
    };
    let _ = outbound_tx.send(welcome);

    let writer_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                message = priority_rx.recv() => {
                    let Some(message) = message else { continue };
                    if send_one(&mut write_half, &message).await.is_err() {
                        break;
                    }
                }
                message = outbound_rx.recv() => {
                    match message {
                        Some(message) => {
                            if send_one(&mut write_half, &message).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    }
                }
            }
        }
    });

    let mut instance: Option<InstanceHandle> = None;
    let mut line = String::new();

    loop {
        line.clear();
        let read = reader.read_line(&mut line).await;
        match read {
            Ok(0) => break, // peer closed
            Ok(_) => {
                if line.len() > shared::MAX_LINE_BYTES {
                    log::warn!(
                        "client {client_id} sent an oversized line ({} bytes), closing",
                        line.len()
                    );
                    break;
                }
                let trimmed = line.trim_end_matches(['\n', '\r']);
                if trimmed.is_empty() {
                    continue;
                }
                match message::decode(trimmed) {
                    Ok(message) => {
                        if !handle_message(&client_id, message, &router, &mut instance, &outbound_tx, &priority_tx)
                            .await
                        {
                            break;
                        }
                    }
                    Err(e) => log::warn!("client {client_id} sent malformed message: {e}"),
                }
            }
            Err(e) => {
                log::warn!("client {client_id} read error: {e}");
                break;
            }
        }
    }

    router.leave(&client_id, instance.as_ref()).await;
    writer_task.abort();
    log::info!("client {client_id} disconnected");
}

/// Handles one decoded message. Returns `false` if the connection should close.
async fn handle_message(
    client_id: &str,
    message: Message,
    router: &Router,
    instance: &mut Option<InstanceHandle>,
    outbound: &mpsc::UnboundedSender<Message>,
    priority: &mpsc::UnboundedSender<Message>,
) -> bool {
    match message {
        Message::Ping => {
            let _ = priority.send(Message::Pong);
        }
        Message::ListMaps => {
            let _ = outbound.send(router.list_maps());
        }
        Message::Join { map } => match router.join(client_id, map.as_deref()).await {
            Ok(handle) => {
                *instance = Some(handle);
            }
            Err(ProtocolError::AlreadyJoined) => {
                let _ = outbound.send(Message::Error {
                    reason: "already_joined".to_string(),
                });
            }
            Err(ProtocolError::NoMapsAvailable) => {
                let _ = outbound.send(Message::Error {
                    reason: "no_maps_available".to_string(),
                });
            }
            Err(e) => log::warn!("client {client_id} join failed: {e}"),
        },
        Message::In { seq, k, dt, .. } => {
            router.input(client_id, seq, k, dt, instance.as_ref());
        }
        Message::Chat { text, .. } => {
            router.chat(client_id, text, instance.as_ref()).await;
        }
        Message::Unknown => {
            log::debug!("client {client_id} sent an unrecognised message tag");
        }
        other => {
            log::debug!("client {client_id} sent a server-bound-invalid message: {other:?}");
        }
    }
    true
}

async fn send_one(
    writer: &mut tokio::net::tcp::OwnedWriteHalf,
    message: &Message,
) -> std::io::Result<()> {
    let line = message::encode(message)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}
