//! The background inbox poller.
//!
//! Spawns a task that periodically fetches new messages, appends them to
//! a shared [`Profile`], persists the profile, and forwards each message
//! on a channel for the caller (typically a UI) to display.
//!
//! The task stops in exactly two ways: [`InboxPoller::shutdown`] is
//! called, or the message receiver is dropped. There is no detached
//! "fire and forget" mode — whoever spawns the poller holds the handle
//! that ends it.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use quill_poll::{PollConfig, PollScheduler};
use quill_store::{Profile, ProfileStore};

use crate::messenger::{MessageRecord, Messenger};

/// Buffered messages between the poller task and its consumer.
const CHANNEL_CAPACITY: usize = 64;

/// Handle to a running inbox poller task.
pub struct InboxPoller {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl InboxPoller {
    /// Spawns the poller task.
    ///
    /// Every new message is appended to `profile`'s received ledger, the
    /// profile is saved through `store`, and the message is forwarded on
    /// the returned channel. A failed fetch or a failed save is logged
    /// and the cadence continues — the next poll is the retry.
    pub fn spawn(
        messenger: Messenger,
        store: ProfileStore,
        profile: Arc<Mutex<Profile>>,
        config: PollConfig,
    ) -> (Self, mpsc::Receiver<MessageRecord>) {
        let (stop_tx, stop_rx) = watch::channel(false);
        let (msg_tx, msg_rx) = mpsc::channel(CHANNEL_CAPACITY);

        let task = tokio::spawn(poll_loop(
            messenger, store, profile, config, stop_rx, msg_tx,
        ));

        (Self { stop_tx, task }, msg_rx)
    }

    /// Signals the poller to stop and waits for the task to finish.
    ///
    /// An in-flight fetch is allowed to complete; no further polls fire
    /// after this returns.
    pub async fn shutdown(self) {
        let _ = self.stop_tx.send(true);
        let _ = self.task.await;
    }
}

async fn poll_loop(
    messenger: Messenger,
    store: ProfileStore,
    profile: Arc<Mutex<Profile>>,
    config: PollConfig,
    mut stop_rx: watch::Receiver<bool>,
    msg_tx: mpsc::Sender<MessageRecord>,
) {
    let mut scheduler = PollScheduler::new(config);
    debug!(username = messenger.username(), "inbox poller started");

    'poll: loop {
        tokio::select! {
            _ = stop_rx.changed() => {
                debug!("inbox poller stopping");
                break 'poll;
            }
            info = scheduler.wait_for_poll() => {
                match messenger.fetch_new().await {
                    Ok(messages) if messages.is_empty() => {}
                    Ok(messages) => {
                        record_messages(&store, &profile, &messages).await;
                        for message in messages {
                            if msg_tx.send(message).await.is_err() {
                                debug!("message receiver dropped, inbox poller stopping");
                                break 'poll;
                            }
                        }
                    }
                    Err(err) => {
                        // Transient by assumption: the next poll retries.
                        warn!(poll = info.poll, error = %err, "inbox poll failed");
                    }
                }
                scheduler.record_poll_end();
            }
        }
    }
}

/// Appends fetched messages to the profile's received ledger and
/// persists it. Persistence failures are logged, not fatal: the messages
/// still reach the consumer, only durability suffered.
async fn record_messages(
    store: &ProfileStore,
    profile: &Arc<Mutex<Profile>>,
    messages: &[MessageRecord],
) {
    let mut profile = profile.lock().await;
    for message in messages {
        profile.add_received(&message.sender, &message.text, message.timestamp.clone());
    }
    match store.save(&profile) {
        Ok(true) => {}
        Ok(false) => warn!(
            path = %store.path().display(),
            "profile save refused, fetched messages not persisted"
        ),
        Err(err) => warn!(
            path = %store.path().display(),
            error = %err,
            "profile save failed, fetched messages not persisted"
        ),
    }
}
