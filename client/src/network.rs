//! Client-side network layer: connects over TCP, decodes newline-delimited JSON on a
//! dedicated reader task, and hands decoded messages to the main loop through a
//! channel it drains non-blockingly each frame (§5, §9: "thread + queue → message
//! passing between a reader task and the render loop").

use shared::message::{self, Message};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// An established connection to a game server. `try_recv` never blocks, matching the
/// "main loop drains the queue non-blockingly each frame" invariant.
pub struct Connection {
    write_half: OwnedWriteHalf,
    inbound: mpsc::UnboundedReceiver<Message>,
    reader_task: JoinHandle<()>,
}

impl Connection {
    /// Connects to `addr`, enabling `TCP_NODELAY`, and spawns the reader task.
    pub async fn connect(addr: &str) -> std::io::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        let (read_half, write_half) = stream.into_split();

        let (tx, rx) = mpsc::unbounded_channel();
        let reader_task = tokio::spawn(async move {
            let mut reader = BufReader::new(read_half);
            let mut line = String::new();
            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => break,
                    Ok(_) => {
                        if line.len() > shared::MAX_LINE_BYTES {
                            log::warn!("server sent an oversized line, disconnecting");
                            break;
                        }
                        let trimmed = line.trim_end_matches(['\n', '\r']);
                        if trimmed.is_empty() {
                            continue;
                        }
                        match message::decode(trimmed) {
                            Ok(decoded) => {
                                if tx.send(decoded).is_err() {
                                    break;
                                }
                            }
                            Err(e) => log::warn!("malformed message from server: {e}"),
                        }
                    }
                    Err(e) => {
                        log::warn!("connection read error: {e}");
                        break;
                    }
                }
            }
        });

        Ok(Self {
            write_half,
            inbound: rx,
            reader_task,
        })
    }

    /// Encodes and sends one message, flushing immediately.
    pub async fn send(&mut self, message: &Message) -> std::io::Result<()> {
        let line = message::encode(message)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        self.write_half.write_all(line.as_bytes()).await?;
        self.write_half.write_all(b"\n").await?;
        self.write_half.flush().await
    }

    /// Drains at most one message from the reader task's queue without blocking.
    pub fn try_recv(&mut self) -> Option<Message> {
        self.inbound.try_recv().ok()
    }

    /// Blocks until the next message arrives or the reader task exits. Used only to
    /// wait for the initial `welcome`/`map_data`/`game_state` handshake at connect time.
    pub async fn recv(&mut self) -> Option<Message> {
        self.inbound.recv().await
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.reader_task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn connect_sends_and_receives_newline_delimited_json() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server_task = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 1024];
            let n = socket.read(&mut buf).await.unwrap();
            let received = String::from_utf8_lossy(&buf[..n]).to_string();
            assert!(received.contains(r#""t":"ping""#));

            socket.write_all(b"{\"t\":\"pong\"}\n").await.unwrap();
        });

        let mut conn = Connection::connect(&addr.to_string()).await.unwrap();
        conn.send(&Message::Ping).await.unwrap();

        let received = conn.recv().await.unwrap();
        assert_eq!(received, Message::Pong);

        server_task.await.unwrap();
    }

    #[tokio::test]
    async fn try_recv_is_non_blocking_when_queue_is_empty() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server_task = tokio::spawn(async move {
            let _ = listener.accept().await.unwrap();
            std::future::pending::<()>().await;
        });

        let mut conn = Connection::connect(&addr.to_string()).await.unwrap();
        assert!(conn.try_recv().is_none());
    }
}
