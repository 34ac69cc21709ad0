//! In-flight request coalescing.
//!
//! Concurrent identical requests share one underlying call: the first
//! caller (the leader) runs the work, every later caller (a follower)
//! waits for the leader's settled outcome. The table entry is removed
//! before any caller observes the result, so a request issued after
//! settlement always starts fresh instead of latching onto stale state.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use tokio::sync::oneshot;

/// Coalesces concurrent work keyed by request identity.
///
/// `T` is the settled outcome; it must be cloneable so one result can be
/// fanned out to every waiting caller.
pub struct FlightTable<T> {
    flights: Mutex<HashMap<String, Vec<oneshot::Sender<T>>>>,
}

enum Role<T> {
    Leader,
    Follower(oneshot::Receiver<T>),
}

impl<T: Clone + Send + 'static> FlightTable<T> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            flights: Mutex::new(HashMap::new()),
        }
    }

    /// Number of keys currently in flight.
    #[must_use]
    pub fn len(&self) -> usize {
        self.flights.lock().expect("flight table lock").len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `key` currently has a leader in flight.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.flights
            .lock()
            .expect("flight table lock")
            .contains_key(key)
    }

    /// Runs `work` under `key`, or joins an identical call already in
    /// flight and reuses its outcome.
    ///
    /// Returns `None` only when a follower's leader was dropped before
    /// settling (the leading caller gave up mid-flight).
    pub async fn run<F>(&self, key: &str, work: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        // Role decision happens inside one short critical section; the
        // guard never survives into the awaits below.
        let role = {
            let mut flights = self.flights.lock().expect("flight table lock");
            if let Some(waiters) = flights.get_mut(key) {
                let (tx, rx) = oneshot::channel();
                waiters.push(tx);
                Role::Follower(rx)
            } else {
                flights.insert(key.to_string(), Vec::new());
                Role::Leader
            }
        };

        match role {
            Role::Follower(rx) => rx.await.ok(),
            Role::Leader => {
                let landing = Landing { table: self, key };
                let value = work.await;
                // The key is gone before anyone sees the outcome: a caller
                // arriving after this point starts a fresh flight.
                let waiters = landing.settle();
                for tx in waiters {
                    let _ = tx.send(value.clone());
                }
                Some(value)
            }
        }
    }
}

impl<T: Clone + Send + 'static> Default for FlightTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Clears the leader's key on settle, and also when the leading future is
/// dropped mid-flight so followers fail fast instead of hanging.
struct Landing<'a, T> {
    table: &'a FlightTable<T>,
    key: &'a str,
}

impl<T> Landing<'_, T> {
    fn settle(self) -> Vec<oneshot::Sender<T>> {
        let waiters = self
            .table
            .flights
            .lock()
            .expect("flight table lock")
            .remove(self.key)
            .unwrap_or_default();
        std::mem::forget(self);
        waiters
    }
}

impl<T> Drop for Landing<'_, T> {
    fn drop(&mut self) {
        self.table
            .flights
            .lock()
            .expect("flight table lock")
            .remove(self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_same_key_runs_once() {
        let table = Arc::new(FlightTable::<u32>::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let lead = tokio::spawn({
            let table = Arc::clone(&table);
            let calls = Arc::clone(&calls);
            async move {
                table
                    .run("GET /posts", async {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        7u32
                    })
                    .await
            }
        });
        tokio::task::yield_now().await;
        assert!(table.contains("GET /posts"));

        let follow = tokio::spawn({
            let table = Arc::clone(&table);
            let calls = Arc::clone(&calls);
            async move {
                table
                    .run("GET /posts", async {
                        calls.fetch_add(1, Ordering::SeqCst);
                        99u32
                    })
                    .await
            }
        });
        tokio::task::yield_now().await;

        assert_eq!(lead.await.unwrap(), Some(7));
        assert_eq!(follow.await.unwrap(), Some(7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!table.contains("GET /posts"));
    }

    #[tokio::test]
    async fn test_sequential_calls_run_independently() {
        let table = FlightTable::<u32>::new();
        let calls = AtomicUsize::new(0);

        let first = table
            .run("k", async {
                calls.fetch_add(1, Ordering::SeqCst);
                1u32
            })
            .await;
        let second = table
            .run("k", async {
                calls.fetch_add(1, Ordering::SeqCst);
                2u32
            })
            .await;

        assert_eq!(first, Some(1));
        assert_eq!(second, Some(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_distinct_keys_do_not_coalesce() {
        let table = Arc::new(FlightTable::<u32>::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for (key, value) in [("a", 1u32), ("b", 2u32)] {
            handles.push(tokio::spawn({
                let table = Arc::clone(&table);
                let calls = Arc::clone(&calls);
                async move {
                    table
                        .run(key, async {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(10)).await;
                            value
                        })
                        .await
                }
            }));
        }
        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }
        assert_eq!(results, vec![Some(1), Some(2)]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_aborted_leader_releases_followers() {
        let table = Arc::new(FlightTable::<u32>::new());

        let lead = tokio::spawn({
            let table = Arc::clone(&table);
            async move {
                table
                    .run("k", async {
                        tokio::time::sleep(Duration::from_secs(999)).await;
                        1u32
                    })
                    .await
            }
        });
        tokio::task::yield_now().await;
        assert!(table.contains("k"));

        let follow = tokio::spawn({
            let table = Arc::clone(&table);
            async move { table.run("k", async { 2u32 }).await }
        });
        tokio::task::yield_now().await;

        lead.abort();
        let _ = lead.await;

        assert_eq!(follow.await.unwrap(), None);
        assert!(!table.contains("k"));
    }
}
