//! Debouncing for rapidly changing input such as a search box.
//!
//! Only the last value of a burst is forwarded, once the input has been quiet
//! for the configured interval. This only reduces how often consumers redo
//! work; query results are correct at any call frequency.

use std::time::Duration;

use tokio::sync::mpsc;

/// Default quiet period for search input.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Forward the last value of each burst from `input` after `quiet` elapses.
///
/// When `input` closes, any pending value is flushed and the output closes.
pub fn debounce<T: Send + 'static>(
    mut input: mpsc::UnboundedReceiver<T>,
    quiet: Duration,
) -> mpsc::UnboundedReceiver<T> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let mut pending: Option<T> = None;
        loop {
            let next = if pending.is_some() {
                match tokio::time::timeout(quiet, input.recv()).await {
                    Ok(next) => next,
                    Err(_) => {
                        if let Some(value) = pending.take() {
                            if tx.send(value).is_err() {
                                return;
                            }
                        }
                        continue;
                    }
                }
            } else {
                input.recv().await
            };

            match next {
                Some(value) => pending = Some(value),
                None => {
                    if let Some(value) = pending.take() {
                        let _ = tx.send(value);
                    }
                    return;
                }
            }
        }
    });

    rx
}
