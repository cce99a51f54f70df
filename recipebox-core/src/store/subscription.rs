//! Live subscription handles.
//!
//! A subscription delivers a full snapshot on open and a fresh snapshot after
//! every change to the watched collection. Delivery runs on a spawned task that
//! forwards pushes through an unbounded channel; aborting that task cancels.

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::hub::ChangeEvent;
use super::StoreError;

/// One delivery from a live subscription.
#[derive(Debug)]
pub enum Push<T> {
    Update(T),
    Error(StoreError),
}

impl<T> Push<T> {
    pub fn into_result(self) -> Result<T, StoreError> {
        match self {
            Push::Update(value) => Ok(value),
            Push::Error(e) => Err(e),
        }
    }
}

/// Handle to a live subscription. Dropping it cancels delivery.
#[derive(Debug)]
pub struct Subscription<T> {
    rx: mpsc::UnboundedReceiver<Push<T>>,
    task: Option<JoinHandle<()>>,
}

impl<T> Subscription<T> {
    /// Builds a subscription from a push channel and the task feeding it.
    pub fn new(rx: mpsc::UnboundedReceiver<Push<T>>, task: Option<JoinHandle<()>>) -> Self {
        Self { rx, task }
    }

    /// Waits for the next push. Returns `None` once delivery has ended.
    pub async fn next(&mut self) -> Option<Push<T>> {
        self.rx.recv().await
    }

    /// Returns an already-queued push without waiting.
    pub fn try_next(&mut self) -> Option<Push<T>> {
        self.rx.try_recv().ok()
    }

    /// Stops delivery and discards anything still queued.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("subscription cancelled");
        }
        self.rx.close();
        while self.rx.try_recv().is_ok() {}
    }

    pub fn is_cancelled(&self) -> bool {
        self.task.is_none()
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Spawns the delivery task for a subscription.
///
/// `read` produces the current snapshot. It runs once up front and again after
/// each change notification; bursts of notifications collapse into one read,
/// and a snapshot equal to the last one delivered is not pushed again. The
/// first error is pushed and ends delivery.
pub(crate) fn spawn<T, F>(mut changes: broadcast::Receiver<ChangeEvent>, mut read: F) -> Subscription<T>
where
    T: Clone + PartialEq + Send + 'static,
    F: FnMut() -> Result<T, StoreError> + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();

    let task = tokio::spawn(async move {
        let mut last: Option<T> = None;

        loop {
            match read() {
                Ok(snapshot) => {
                    if last.as_ref() != Some(&snapshot) {
                        if tx.send(Push::Update(snapshot.clone())).is_err() {
                            break;
                        }
                        last = Some(snapshot);
                    }
                }
                Err(e) => {
                    warn!(error = %e, "subscription read failed");
                    let _ = tx.send(Push::Error(e));
                    break;
                }
            }

            match changes.recv().await {
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "subscriber lagged, re-reading snapshot");
                }
                Err(RecvError::Closed) => break,
            }

            loop {
                match changes.try_recv() {
                    Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
                    Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                }
            }
        }
    });

    Subscription::new(rx, Some(task))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CollectionPath;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn event() -> ChangeEvent {
        ChangeEvent {
            collection: CollectionPath::recipes(),
        }
    }

    #[tokio::test]
    async fn test_first_push_is_snapshot() {
        let (_tx, rx) = broadcast::channel(4);
        let mut sub = spawn(rx, || Ok(vec![1, 2, 3]));

        match sub.next().await {
            Some(Push::Update(v)) => assert_eq!(v, vec![1, 2, 3]),
            other => panic!("unexpected push: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_change_triggers_new_snapshot() {
        let (tx, rx) = broadcast::channel(4);
        let counter = Arc::new(AtomicUsize::new(0));
        let reads = counter.clone();
        let mut sub = spawn(rx, move || Ok(reads.fetch_add(1, Ordering::SeqCst)));

        assert!(matches!(sub.next().await, Some(Push::Update(0))));
        tx.send(event()).unwrap();
        assert!(matches!(sub.next().await, Some(Push::Update(1))));
    }

    #[tokio::test]
    async fn test_identical_snapshot_not_repeated() {
        let (tx, rx) = broadcast::channel(4);
        let counter = Arc::new(AtomicUsize::new(0));
        let reads = counter.clone();
        // Same value for the first two reads, then a new one
        let mut sub = spawn(rx, move || Ok(reads.fetch_add(1, Ordering::SeqCst) / 2));

        assert!(matches!(sub.next().await, Some(Push::Update(0))));
        tx.send(event()).unwrap();
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        tx.send(event()).unwrap();
        assert!(matches!(sub.next().await, Some(Push::Update(1))));
    }

    #[tokio::test]
    async fn test_error_ends_delivery() {
        let (tx, rx) = broadcast::channel(4);
        let mut first = true;
        let mut sub = spawn(rx, move || {
            if first {
                first = false;
                Ok("ok")
            } else {
                Err(StoreError::Unavailable("offline".into()))
            }
        });

        assert!(matches!(sub.next().await, Some(Push::Update("ok"))));
        tx.send(event()).unwrap();
        assert!(matches!(sub.next().await, Some(Push::Error(_))));
        assert!(sub.next().await.is_none());
    }

    #[tokio::test]
    async fn test_lagged_receiver_gets_latest() {
        let (tx, rx) = broadcast::channel(1);
        let counter = Arc::new(AtomicUsize::new(0));
        let reads = counter.clone();
        let mut sub = spawn(rx, move || Ok(reads.fetch_add(1, Ordering::SeqCst)));

        assert!(matches!(sub.next().await, Some(Push::Update(0))));
        for _ in 0..5 {
            tx.send(event()).unwrap();
        }
        match sub.next().await {
            Some(Push::Update(n)) => assert!(n >= 1),
            other => panic!("unexpected push: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancel_stops_delivery() {
        let (tx, rx) = broadcast::channel(4);
        let mut sub = spawn(rx, || Ok(1));

        assert!(matches!(sub.next().await, Some(Push::Update(1))));
        sub.cancel();
        let _ = tx.send(event());

        assert!(sub.is_cancelled());
        assert!(sub.next().await.is_none());
    }
}
