//! Data bridge: connects [`Watcher`] and notifier streams to TUI actions.
//!
//! Runs as a background task: starts the watcher (defaults, timer, first
//! poll), then forwards every record change, alert and badge update as an
//! [`Action`] through the TUI's action channel.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use vacwatch_core::{ChannelNotifier, NotifierEvent, Watcher};

use crate::action::{Action, Notification};

/// Spawn the data bridge between the watcher and the TUI.
///
/// Shuts down on cancellation; the caller owns `watcher.shutdown()`.
pub async fn spawn_data_bridge(
    watcher: Watcher,
    notifier: Arc<ChannelNotifier>,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let mut records = watcher.subscribe();
    let mut events = notifier.subscribe();
    let mut badge = notifier.badge();

    // Initial snapshot so the Watch screen has data before the first poll.
    let snapshot = records.borrow_and_update().clone();
    let _ = action_tx.send(Action::RecordUpdated(Arc::new(snapshot)));
    let _ = action_tx.send(Action::BadgeUpdated(badge.borrow_and_update().clone()));

    match watcher.start().await {
        Ok(outcome) => {
            let _ = action_tx.send(Action::PollFinished(outcome));
        }
        Err(e) => {
            warn!(error = %e, "watcher failed to start");
            let _ = action_tx.send(Action::Notify(Notification::error(format!(
                "Watcher failed to start: {e}"
            ))));
        }
    }
    watcher.watch_external().await;

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Ok(()) = records.changed() => {
                let record = records.borrow_and_update().clone();
                debug!(last_count = ?record.state.last_count, "dispatching RecordUpdated");
                let _ = action_tx.send(Action::RecordUpdated(Arc::new(record)));
            }
            Ok(()) = badge.changed() => {
                let current = badge.borrow_and_update().clone();
                let _ = action_tx.send(Action::BadgeUpdated(current));
            }
            event = events.recv() => match event {
                Ok(NotifierEvent::Alert(alert)) => {
                    let _ = action_tx.send(Action::Alert(alert));
                }
                // Badge changes arrive on the watch channel above.
                Ok(NotifierEvent::Badge(_)) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "notifier events lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    debug!("data bridge shut down");
}
