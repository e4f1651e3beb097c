use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use spdlog::{debug, warn};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::grammar::client::{CheckResult, GrammarClient};

/// How a submission ended. A superseded submission ends with the sender
/// dropped instead, which the receiver sees as a closed channel.
#[derive(Debug)]
pub enum CheckOutcome {
    Checked(CheckResult),
    Cleared,
    Failed(String),
}

/// Serializes grammar checks behind an idle window. Every `submit` replaces
/// the previous one: the old task is aborted, and a generation counter is
/// re-checked around the network call so a stale result can never land on
/// top of newer text.
pub struct DebouncedChecker {
    client: Arc<GrammarClient>,
    debounce: Duration,
    generation: Arc<AtomicU64>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl DebouncedChecker {
    pub fn new(client: GrammarClient, debounce: Duration) -> Self {
        DebouncedChecker {
            client: Arc::new(client),
            debounce,
            generation: Arc::new(AtomicU64::new(0)),
            pending: Mutex::new(None),
        }
    }

    /// Queues `text` for checking once it has been idle for the debounce
    /// window. Empty text resolves to `Cleared` right away, still cancelling
    /// whatever was in flight.
    pub fn submit(&self, text: String, language: String) -> oneshot::Receiver<CheckOutcome> {
        let (tx, rx) = oneshot::channel();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(stale) = self.pending.lock().unwrap().take() {
            debug!("Cancelling superseded grammar check");
            stale.abort();
        }

        if text.trim().is_empty() {
            let _ = tx.send(CheckOutcome::Cleared);
            return rx;
        }

        let client = self.client.clone();
        let generations = self.generation.clone();
        let debounce = self.debounce;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if generations.load(Ordering::SeqCst) != generation {
                return;
            }

            let outcome = match client.check(&text, &language).await {
                Ok(result) => CheckOutcome::Checked(result),
                Err(e) => {
                    warn!("Grammar check failed: {:#}", e);
                    CheckOutcome::Failed(e.to_string())
                }
            };

            // The text may have changed while the request was in flight
            if generations.load(Ordering::SeqCst) == generation {
                let _ = tx.send(outcome);
            }
        });

        *self.pending.lock().unwrap() = Some(handle);

        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(endpoint: &str, debounce_ms: u64) -> DebouncedChecker {
        DebouncedChecker::new(
            GrammarClient::new(endpoint.to_string()),
            Duration::from_millis(debounce_ms),
        )
    }

    #[ntex::test]
    async fn test_empty_text_clears_immediately() {
        let checker = checker("http://127.0.0.1:9/v2/check", 5_000);
        let outcome = checker.submit("   ".to_string(), "auto".to_string()).await;
        assert!(matches!(outcome, Ok(CheckOutcome::Cleared)));
    }

    #[ntex::test]
    async fn test_newer_submission_supersedes_older() {
        let checker = checker("http://127.0.0.1:9/v2/check", 5_000);

        let first = checker.submit("first draft".to_string(), "auto".to_string());
        let _second = checker.submit("second draft".to_string(), "auto".to_string());

        // The first task was aborted before its window elapsed, so its
        // sender is gone
        assert!(first.await.is_err());
    }

    #[ntex::test]
    async fn test_clearing_cancels_pending_check() {
        let checker = checker("http://127.0.0.1:9/v2/check", 5_000);

        let pending = checker.submit("draft text".to_string(), "auto".to_string());
        let cleared = checker.submit(String::new(), "auto".to_string()).await;

        assert!(matches!(cleared, Ok(CheckOutcome::Cleared)));
        assert!(pending.await.is_err());
    }

    #[ntex::test]
    async fn test_unreachable_service_reports_failure() {
        // Closed loopback port: connection refused, not a hang
        let checker = checker("http://127.0.0.1:9/v2/check", 10);
        let outcome = checker
            .submit("some text to check".to_string(), "auto".to_string())
            .await;
        assert!(matches!(outcome, Ok(CheckOutcome::Failed(_))));
    }
}
