//! # taskboard-tail
//!
//! Operational tool that logs into a Taskboard server, follows the given
//! topics on the realtime channel, and prints events as they arrive.
//!
//! ## Usage
//!
//! ```bash
//! TASKBOARD_URL=http://127.0.0.1:1337 \
//! TASKBOARD_EMAIL=alice@example.com \
//! TASKBOARD_PASSWORD=hunter2hunter2 \
//! cargo run -p taskboard-client -- task:<uid> project:<uid>
//! ```
//!
//! With no topic arguments only the user's own notification events are
//! shown.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use taskboard_client::{api::ApiClient, connection::RealtimeConnection, store::ClientStore};
use taskboard_shared::events::Topic;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskboard_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_url =
        std::env::var("TASKBOARD_URL").unwrap_or_else(|_| "http://127.0.0.1:1337".to_string());
    let email = std::env::var("TASKBOARD_EMAIL")
        .map_err(|_| anyhow::anyhow!("TASKBOARD_EMAIL environment variable is required"))?;
    let password = std::env::var("TASKBOARD_PASSWORD")
        .map_err(|_| anyhow::anyhow!("TASKBOARD_PASSWORD environment variable is required"))?;

    let topics: Vec<Topic> = std::env::args()
        .skip(1)
        .map(|arg| {
            arg.parse()
                .map_err(|e| anyhow::anyhow!("Invalid topic '{}': {}", arg, e))
        })
        .collect::<anyhow::Result<_>>()?;

    let mut client = ApiClient::new(&base_url);
    let session = client.login(&email, &password).await?;
    tracing::info!(uid = %session.uid, role = %session.role, "Logged in");

    let store = Arc::new(Mutex::new(ClientStore::new()));
    store
        .lock()
        .unwrap()
        .set_login(session.token.clone(), session.uid, session.role.clone());

    // Seed the notification list before tailing.
    let notifications = client.list_notifications().await?;
    tracing::info!(count = notifications.len(), "Fetched notifications");
    store.lock().unwrap().set_notifications(notifications);

    let (connection, handle) = RealtimeConnection::new(&base_url, &session.token, store.clone());
    for topic in &topics {
        handle.subscribe(*topic);
    }

    let connection_task = tokio::spawn(connection.run());

    tracing::info!("Tailing events (ctrl-c to exit)");
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    let mut last_unread = store.lock().unwrap().unread_count();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {
                let (statuses, comments, unread) = {
                    let mut store = store.lock().unwrap();
                    (
                        store.drain_task_status_updates(),
                        store.drain_new_comments(),
                        store.unread_count(),
                    )
                };

                for update in statuses {
                    println!(
                        "task {} -> {} at {}",
                        update.task_uid, update.status, update.updated_at
                    );
                }
                for comment in comments {
                    println!(
                        "comment {} on task {} by {}: {}",
                        comment.comment_uid, comment.task_uid, comment.user_uid, comment.content
                    );
                }
                if unread != last_unread {
                    println!("{} unread notification(s)", unread);
                    last_unread = unread;
                }
            }
        }
    }

    handle.shutdown();
    let _ = tokio::time::timeout(Duration::from_secs(5), connection_task).await;

    Ok(())
}
