// Copyright 2026 the Tacsym Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Asynchronous icon loading.
//!
//! Retrieval runs on a [`LoadExecutor`]; results come back over a per-request channel and are
//! installed on the render thread when the owner polls. Cancellation is advisory: dropping a
//! [`PendingLoad`] raises a flag the task checks before and after retrieval.

use core::fmt::{Debug, Formatter};
use core::task::Poll;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use log::{debug, warn};

use crate::{IconImage, IconSourceKey, RetrieveError};

/// A unit of loading work.
pub type LoadTask = Box<dyn FnOnce() + Send + 'static>;

/// Runs [`LoadTask`]s.
pub trait LoadExecutor: Send {
    /// Schedules `task`.
    ///
    /// Returns `false` if the task could not be accepted right now, in which case it is dropped
    /// and the request is retried on a later frame.
    fn try_spawn(&self, task: LoadTask) -> bool;
}

/// Runs every task inline on the calling thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateExecutor;

impl LoadExecutor for ImmediateExecutor {
    fn try_spawn(&self, task: LoadTask) -> bool {
        task();
        true
    }
}

/// A fixed set of worker threads fed by a bounded queue.
pub struct WorkerPool {
    sender: Option<flume::Sender<LoadTask>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Starts `workers` threads sharing a queue of `queue_capacity` tasks.
    ///
    /// Threads that fail to start are logged and skipped. With no running workers every
    /// [`try_spawn`](LoadExecutor::try_spawn) fails.
    pub fn new(workers: usize, queue_capacity: usize) -> Self {
        let (sender, receiver) = flume::bounded::<LoadTask>(queue_capacity.max(1));
        let mut handles = Vec::with_capacity(workers);
        for index in 0..workers {
            let receiver = receiver.clone();
            let spawned = std::thread::Builder::new()
                .name(format!("tacsym-icon-loader-{index}"))
                .spawn(move || {
                    while let Ok(task) = receiver.recv() {
                        // A panicking retriever loses its own request; the worker keeps serving.
                        if catch_unwind(AssertUnwindSafe(task)).is_err() {
                            warn!("icon loader worker {index} recovered from a panicking task");
                        }
                    }
                });
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(err) => warn!("failed to spawn icon loader worker {index}: {err}"),
            }
        }
        Self {
            sender: (!handles.is_empty()).then_some(sender),
            workers: handles,
        }
    }

    /// Number of running worker threads.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

impl LoadExecutor for WorkerPool {
    fn try_spawn(&self, task: LoadTask) -> bool {
        match &self.sender {
            Some(sender) => sender.try_send(task).is_ok(),
            None => false,
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Closing the queue ends each worker's receive loop once it drains.
        self.sender = None;
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

impl Debug for WorkerPool {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers.len())
            .finish_non_exhaustive()
    }
}

/// Load state of a cached image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadState {
    /// No request has been made.
    #[default]
    Unloaded,
    /// A request is in flight.
    Loading,
    /// Pixel data is available.
    Loaded,
    /// Retrieval failed or found nothing. Never retried.
    Failed,
}

/// The result of one retrieval.
pub(crate) enum LoadOutcome {
    Loaded(IconImage),
    NotFound,
    Failed(RetrieveError),
    /// The task went away without reporting, e.g. because the retriever panicked.
    Lost,
}

/// Handle on an in-flight request. Dropping it cancels the request.
pub(crate) struct PendingLoad {
    receiver: flume::Receiver<LoadOutcome>,
    cancel: Arc<AtomicBool>,
}

impl PendingLoad {
    /// Takes the outcome if the task has finished.
    pub(crate) fn poll(&self) -> Poll<LoadOutcome> {
        match self.receiver.try_recv() {
            Ok(outcome) => Poll::Ready(outcome),
            Err(flume::TryRecvError::Empty) => Poll::Pending,
            Err(flume::TryRecvError::Disconnected) => Poll::Ready(LoadOutcome::Lost),
        }
    }
}

impl Drop for PendingLoad {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::Release);
    }
}

impl Debug for PendingLoad {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PendingLoad")
            .field("cancelled", &self.cancel.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// Issues icon retrievals on an executor and reports completed loads.
pub struct IconLoader {
    executor: Box<dyn LoadExecutor>,
    ready_tx: flume::Sender<IconSourceKey>,
    ready_rx: flume::Receiver<IconSourceKey>,
}

impl IconLoader {
    /// Creates a loader running retrievals on `executor`.
    pub fn new(executor: impl LoadExecutor + 'static) -> Self {
        let (ready_tx, ready_rx) = flume::unbounded();
        Self {
            executor: Box::new(executor),
            ready_tx,
            ready_rx,
        }
    }

    /// A loader that retrieves inline, so every request completes before it returns.
    pub fn immediate() -> Self {
        Self::new(ImmediateExecutor)
    }

    /// A loader backed by a [`WorkerPool`].
    pub fn threaded(workers: usize, queue_capacity: usize) -> Self {
        Self::new(WorkerPool::new(workers, queue_capacity))
    }

    /// Starts retrieving `source`.
    ///
    /// Returns `None` when the executor cannot take the request right now.
    pub(crate) fn request(&self, source: &IconSourceKey) -> Option<PendingLoad> {
        let (tx, rx) = flume::bounded(1);
        let cancel = Arc::new(AtomicBool::new(false));
        let task_cancel = Arc::clone(&cancel);
        let ready = self.ready_tx.clone();
        let source = source.clone();
        let task: LoadTask = Box::new(move || {
            if task_cancel.load(Ordering::Acquire) {
                return;
            }
            let outcome = match source.retrieve() {
                Ok(Some(image)) => LoadOutcome::Loaded(image),
                Ok(None) => LoadOutcome::NotFound,
                Err(err) => LoadOutcome::Failed(err),
            };
            if task_cancel.load(Ordering::Acquire) {
                debug!("discarding stale icon load for {:?}", source.symbol_id());
                return;
            }
            if matches!(outcome, LoadOutcome::Loaded(_)) {
                let _ = ready.send(source);
            }
            let _ = tx.send(outcome);
        });
        self.executor
            .try_spawn(task)
            .then(|| PendingLoad { receiver: rx, cancel })
    }

    /// Drains the keys whose images finished loading since the last call.
    ///
    /// A host uses this to schedule a redraw so placeholders are swapped for real icons.
    pub fn take_ready(&self) -> Vec<IconSourceKey> {
        self.ready_rx.try_iter().collect()
    }
}

impl Debug for IconLoader {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IconLoader")
            .field("ready", &self.ready_rx.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use peniko::color::palette;
    use tacsym_primitives::Modifiers;

    use crate::IconRetriever;

    struct Gate {
        calls: AtomicUsize,
        release: Mutex<Option<flume::Receiver<()>>>,
    }

    impl IconRetriever for Gate {
        fn retriever_id(&self) -> &str {
            "gate"
        }

        fn create_icon(
            &self,
            _symbol_id: &str,
            _params: &Modifiers,
        ) -> Result<Option<IconImage>, RetrieveError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let release = self.release.lock().unwrap().clone();
            if let Some(release) = release {
                let _ = release.recv();
            }
            Ok(IconImage::solid(4, 4, palette::css::BLUE))
        }
    }

    fn wait_for(pending: &PendingLoad) -> LoadOutcome {
        for _ in 0..500 {
            if let Poll::Ready(outcome) = pending.poll() {
                return outcome;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        panic!("load did not finish");
    }

    #[test]
    fn test_immediate_loader_completes_inline() {
        let retriever: Arc<dyn IconRetriever> = Arc::new(Gate {
            calls: AtomicUsize::new(0),
            release: Mutex::new(None),
        });
        let key = IconSourceKey::new(&retriever, "a", Modifiers::new());
        let loader = IconLoader::immediate();
        let pending = loader.request(&key).unwrap();
        assert!(matches!(pending.poll(), Poll::Ready(LoadOutcome::Loaded(_))));
        assert_eq!(loader.take_ready(), vec![key]);
        assert!(loader.take_ready().is_empty());
    }

    #[test]
    fn test_threaded_loader_reports_result() {
        let retriever: Arc<dyn IconRetriever> = Arc::new(Gate {
            calls: AtomicUsize::new(0),
            release: Mutex::new(None),
        });
        let key = IconSourceKey::new(&retriever, "a", Modifiers::new());
        let loader = IconLoader::threaded(2, 8);
        let pending = loader.request(&key).unwrap();
        assert!(matches!(wait_for(&pending), LoadOutcome::Loaded(_)));
    }

    #[test]
    fn test_cancelled_load_is_not_reported_ready() {
        let (release_tx, release_rx) = flume::bounded(1);
        let gate = Arc::new(Gate {
            calls: AtomicUsize::new(0),
            release: Mutex::new(Some(release_rx)),
        });
        let retriever: Arc<dyn IconRetriever> = gate.clone();
        let stale = IconSourceKey::new(&retriever, "stale", Modifiers::new());
        let loader = IconLoader::threaded(1, 4);

        let pending = loader.request(&stale).unwrap();
        while gate.calls.load(Ordering::SeqCst) == 0 {
            std::thread::sleep(Duration::from_millis(1));
        }
        // Superseded while the retriever is still running.
        drop(pending);
        release_tx.send(()).unwrap();

        // A fresh request goes through without waiting on the old one.
        *gate.release.lock().unwrap() = None;
        let fresh = IconSourceKey::new(&retriever, "fresh", Modifiers::new());
        let pending = loader.request(&fresh).unwrap();
        assert!(matches!(wait_for(&pending), LoadOutcome::Loaded(_)));
        assert_eq!(loader.take_ready(), vec![fresh]);
    }

    struct Panicky;

    impl IconRetriever for Panicky {
        fn retriever_id(&self) -> &str {
            "panicky"
        }

        fn create_icon(
            &self,
            symbol_id: &str,
            _params: &Modifiers,
        ) -> Result<Option<IconImage>, RetrieveError> {
            assert_ne!(symbol_id, "boom", "retriever blew up");
            Ok(IconImage::solid(2, 2, palette::css::RED))
        }
    }

    #[test]
    fn test_panicking_retriever_keeps_worker_alive() {
        let retriever: Arc<dyn IconRetriever> = Arc::new(Panicky);
        let loader = IconLoader::threaded(1, 4);

        let bad = IconSourceKey::new(&retriever, "boom", Modifiers::new());
        let pending = loader.request(&bad).unwrap();
        assert!(matches!(wait_for(&pending), LoadOutcome::Lost));

        let good = IconSourceKey::new(&retriever, "fine", Modifiers::new());
        let pending = loader.request(&good).unwrap();
        assert!(matches!(wait_for(&pending), LoadOutcome::Loaded(_)));
        assert_eq!(loader.take_ready(), vec![good]);
    }

    #[test]
    fn test_full_queue_refuses_request() {
        let (release_tx, release_rx) = flume::bounded(0);
        let gate = Arc::new(Gate {
            calls: AtomicUsize::new(0),
            release: Mutex::new(Some(release_rx)),
        });
        let retriever: Arc<dyn IconRetriever> = gate.clone();
        let loader = IconLoader::threaded(1, 1);
        let key = IconSourceKey::new(&retriever, "a", Modifiers::new());

        let first = loader.request(&key).unwrap();
        while gate.calls.load(Ordering::SeqCst) == 0 {
            std::thread::sleep(Duration::from_millis(1));
        }
        // The worker is busy, so the single queue slot fills and the next request is refused.
        let queued = loader.request(&key);
        assert!(queued.is_some());
        assert!(loader.request(&key).is_none());

        release_tx.send(()).unwrap();
        release_tx.send(()).unwrap();
        assert!(matches!(wait_for(&first), LoadOutcome::Loaded(_)));
        drop(queued);
    }
}
