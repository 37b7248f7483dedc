use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, info, warn};
use uuid::Uuid;

use pulse_types::events::ClientCommand;

use crate::dispatcher::Dispatcher;

/// Heartbeat interval: server sends a Ping every 15 seconds.
/// If 2 consecutive Pongs are missed (~30s), the connection is dropped and
/// its room memberships torn down.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

/// Identity resolved at connect time. Missing or invalid credentials are not
/// an error: the connection simply proceeds anonymously.
#[derive(Debug, Clone)]
pub struct ConnectionIdentity {
    pub user_id: i64,
    pub name: String,
}

/// Drive one WebSocket connection: register with the dispatcher, forward
/// room events to the socket, and apply join/leave commands from the client.
pub async fn handle_connection(
    socket: WebSocket,
    dispatcher: Dispatcher,
    identity: Option<ConnectionIdentity>,
) {
    let (mut sender, mut receiver) = socket.split();

    let (conn_id, mut event_rx) = dispatcher.register(identity.as_ref().map(|i| i.user_id)).await;

    match &identity {
        Some(id) => info!("{} ({}) connected as {}", id.name, id.user_id, conn_id),
        None => info!("Anonymous client connected as {}", conn_id),
    }

    let pong_received = Arc::new(AtomicBool::new(true));
    let pong_flag_send = pong_received.clone();
    let pong_flag_recv = pong_received.clone();

    // Forward dispatcher events -> client, with heartbeat
    let mut send_task = tokio::spawn(async move {
        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
        heartbeat.tick().await;
        let mut missed_heartbeats: u8 = 0;

        loop {
            tokio::select! {
                result = event_rx.recv() => {
                    let event = match result {
                        Some(event) => event,
                        None => break,
                    };
                    let text = serde_json::to_string(&event).unwrap();
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                _ = heartbeat.tick() => {
                    if pong_flag_send.swap(false, Ordering::Acquire) {
                        missed_heartbeats = 0;
                    } else {
                        missed_heartbeats += 1;
                        if missed_heartbeats >= 2 {
                            warn!("Heartbeat timeout (missed {} pongs), dropping connection", missed_heartbeats);
                            break;
                        }
                    }
                    if sender.send(Message::Ping(vec![].into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    // Read room commands from client
    let dispatcher_recv = dispatcher.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<ClientCommand>(&text) {
                    Ok(cmd) => handle_command(&dispatcher_recv, conn_id, cmd).await,
                    Err(e) => {
                        warn!(
                            "{} bad command: {} -- raw: {}",
                            conn_id,
                            e,
                            truncate_for_log(&text, 200)
                        );
                    }
                },
                Message::Pong(_) => {
                    pong_flag_recv.store(true, Ordering::Release);
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    dispatcher.unregister(conn_id).await;
    match &identity {
        Some(id) => info!("{} ({}) disconnected", id.name, id.user_id),
        None => info!("Anonymous client {} disconnected", conn_id),
    }
}

async fn handle_command(dispatcher: &Dispatcher, conn_id: Uuid, cmd: ClientCommand) {
    match cmd {
        ClientCommand::JoinIdea(idea_id) => {
            debug!("{} joining room for idea {}", conn_id, idea_id);
            dispatcher.join(conn_id, idea_id).await;
        }
        ClientCommand::LeaveIdea(idea_id) => {
            debug!("{} leaving room for idea {}", conn_id, idea_id);
            dispatcher.leave(conn_id, idea_id).await;
        }
    }
}

/// Cap client-supplied text for log lines. The cut must land on a char
/// boundary; `max_bytes` is a ceiling, not an exact length.
fn truncate_for_log(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_truncation_respects_char_boundaries() {
        // 3-byte chars put every boundary at a multiple of 3, so a cap of
        // 200 falls mid-char.
        let frame = "✓".repeat(100);
        let cut = truncate_for_log(&frame, 200);
        assert_eq!(cut.len(), 198);
        assert!(cut.chars().all(|c| c == '✓'));

        let short = "join please";
        assert_eq!(truncate_for_log(short, 200), short);
    }
}
