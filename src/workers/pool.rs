use super::partition::OwnedRange;
use super::snapshot::{ObjectSnapshot, WorkerReply, WorkerRequest};
use super::worker::{serve, CollisionWorker};
use crate::config::CollisionConfig;
use crate::error::Result;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{info, trace, warn};

/// What one worker receives for a step: its snapshots and the pair anchors it owns.
#[derive(Debug, Clone, Default)]
pub struct WorkerBatch {
    pub region: OwnedRange,
    pub objects: Vec<ObjectSnapshot>,
}

struct WorkerHandle {
    requests: Sender<WorkerRequest>,
    thread: Option<JoinHandle<()>>,
}

/// Fixed set of worker threads fed over channels. Every worker shares one reply
/// channel; `dispatch` waits on it until all replies for the step arrive or the step
/// deadline passes.
pub struct WorkerPool {
    workers: Vec<WorkerHandle>,
    replies: Receiver<WorkerReply>,
    timeout: Duration,
}

impl WorkerPool {
    /// Spawns `count` threads, each running a [`CollisionWorker`] built from `config`.
    pub fn start(count: usize, config: &CollisionConfig) -> Result<Self> {
        let mut handlers = Vec::with_capacity(count);
        for index in 0..count.max(1) {
            let mut worker = CollisionWorker::new(index, config)?;
            handlers.push(move |request: WorkerRequest| worker.process(request));
        }
        Self::with_handlers(handlers, config.worker_timeout())
    }

    /// Spawns one thread per handler. Handler `i` serves worker index `i` and should
    /// answer with `WorkerReply::worker == i`.
    pub fn with_handlers<F>(handlers: Vec<F>, timeout: Duration) -> Result<Self>
    where
        F: FnMut(WorkerRequest) -> WorkerReply + Send + 'static,
    {
        let (reply_tx, replies) = mpsc::channel();
        let mut workers = Vec::with_capacity(handlers.len());
        for (index, handler) in handlers.into_iter().enumerate() {
            let (requests, request_rx) = mpsc::channel();
            let reply_tx = reply_tx.clone();
            let thread = thread::Builder::new()
                .name(format!("collision-worker-{index}"))
                .spawn(move || serve(index, handler, request_rx, reply_tx))?;
            workers.push(WorkerHandle {
                requests,
                thread: Some(thread),
            });
        }
        info!(workers = workers.len(), timeout_ms = timeout.as_millis() as u64, "worker pool started");
        Ok(Self {
            workers,
            replies,
            timeout,
        })
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sends `batches[i]` to worker `i` and collects the replies for `step`.
    ///
    /// Slot `i` of the result is `None` if worker `i` did not answer before the
    /// deadline or has gone away. Empty batches are answered locally without a round
    /// trip. Replies left over from earlier steps are discarded.
    pub fn dispatch(&mut self, step: u64, batches: Vec<WorkerBatch>) -> Vec<Option<WorkerReply>> {
        let deadline = Instant::now() + self.timeout;
        let mut replies: Vec<Option<WorkerReply>> = (0..self.workers.len()).map(|_| None).collect();
        let mut pending = 0usize;

        for (worker, batch) in batches.into_iter().enumerate() {
            let Some(handle) = self.workers.get(worker) else {
                warn!(worker, "batch for a worker that does not exist");
                continue;
            };
            if batch.objects.is_empty() {
                replies[worker] = Some(WorkerReply::empty(step, worker));
                continue;
            }
            let request = WorkerRequest {
                step,
                worker,
                region: batch.region,
                objects: batch.objects,
            };
            if handle.requests.send(request).is_err() {
                warn!(worker, step, "worker channel disconnected");
                continue;
            }
            pending += 1;
        }

        while pending > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.replies.recv_timeout(remaining) {
                Ok(reply) if reply.step != step => {
                    trace!(worker = reply.worker, stale = reply.step, step, "discarding stale reply");
                }
                Ok(reply) => {
                    let worker = reply.worker;
                    match replies.get_mut(worker) {
                        Some(slot) if slot.is_none() => {
                            *slot = Some(reply);
                            pending -= 1;
                        }
                        _ => warn!(worker, step, "unexpected reply"),
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    warn!(step, missing = pending, "workers missed the step deadline");
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => {
                    warn!(step, missing = pending, "all worker channels disconnected");
                    break;
                }
            }
        }
        replies
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Dropping the handles closes every request channel before the first join.
        let threads: Vec<_> = self.workers.drain(..).map(|w| w.thread).collect();
        for (index, thread) in threads.into_iter().enumerate() {
            if let Some(thread) = thread {
                if thread.join().is_err() {
                    warn!(worker = index, "collision worker panicked");
                }
            }
        }
        info!("worker pool stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;
    use crate::objects::Body;
    use crate::shapes::Polygon;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn batch(ids: &[u64]) -> WorkerBatch {
        let objects = ids
            .iter()
            .map(|&id| {
                let body = Body::new(id, Polygon::rectangle(2.0, 2.0).unwrap(), Vec2::new(id as f64 * 10.0, 0.0));
                ObjectSnapshot::capture(&body)
            })
            .collect();
        WorkerBatch {
            region: OwnedRange::UNBOUNDED,
            objects,
        }
    }

    #[test]
    fn test_start_and_dispatch() {
        let config = CollisionConfig {
            worker_timeout_ms: 5_000,
            ..CollisionConfig::default()
        };
        let mut pool = WorkerPool::start(2, &config).unwrap();
        assert_eq!(pool.len(), 2);
        let replies = pool.dispatch(1, vec![batch(&[1, 2]), batch(&[3])]);
        assert_eq!(replies.len(), 2);
        let first = replies[0].as_ref().unwrap();
        assert_eq!(first.worker, 0);
        assert_eq!(first.corrections.len(), 2);
        assert_eq!(replies[1].as_ref().unwrap().corrections.len(), 1);
    }

    #[test]
    fn test_empty_batches_answered_locally() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let handler = move |r: WorkerRequest| {
            seen.fetch_add(1, Ordering::SeqCst);
            WorkerReply::empty(r.step, r.worker)
        };
        let mut pool = WorkerPool::with_handlers(vec![handler], Duration::from_millis(500)).unwrap();
        let replies = pool.dispatch(5, vec![WorkerBatch::default()]);
        assert_eq!(replies[0].as_ref().unwrap().step, 5);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_slow_worker_times_out_and_late_reply_is_dropped() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let handler = move |r: WorkerRequest| {
            if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                thread::sleep(Duration::from_millis(200));
            }
            WorkerReply::empty(r.step, r.worker)
        };
        let mut pool = WorkerPool::with_handlers(vec![handler], Duration::from_millis(20)).unwrap();

        let first = pool.dispatch(1, vec![batch(&[1])]);
        assert!(first[0].is_none());

        // Let the late step-1 reply land in the channel before step 2 is collected.
        thread::sleep(Duration::from_millis(300));
        let second = pool.dispatch(2, vec![batch(&[1])]);
        assert_eq!(second[0].as_ref().unwrap().step, 2);
    }

    #[test]
    fn test_overloaded_worker_skips_superseded_steps() {
        // Steps arrive faster than the worker can answer them.
        let handled = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&handled);
        let handler = move |r: WorkerRequest| {
            log.lock().unwrap().push(r.step);
            thread::sleep(Duration::from_millis(30));
            WorkerReply::empty(r.step, r.worker)
        };
        let mut pool = WorkerPool::with_handlers(vec![handler], Duration::from_millis(10)).unwrap();
        for step in 1..=40 {
            pool.dispatch(step, vec![batch(&[1])]);
        }
        // Joins the thread, so every step the worker will ever handle is logged.
        drop(pool);

        let handled = handled.lock().unwrap();
        assert!(handled.windows(2).all(|w| w[0] < w[1]), "{handled:?}");
        assert_eq!(handled.last(), Some(&40));
        assert!(handled.len() < 40, "{handled:?}");
    }

    #[test]
    fn test_region_reaches_the_worker() {
        let (tx, rx) = std::sync::mpsc::channel();
        let handler = move |r: WorkerRequest| {
            tx.send(r.region).unwrap();
            WorkerReply::empty(r.step, r.worker)
        };
        let mut pool = WorkerPool::with_handlers(vec![handler], Duration::from_millis(5_000)).unwrap();
        let region = OwnedRange::new(Some(-5.0), Some(5.0));
        let replies = pool.dispatch(1, vec![WorkerBatch { region, ..batch(&[1]) }]);
        assert!(replies[0].is_some());
        assert_eq!(rx.recv().unwrap(), region);
    }

    #[test]
    fn test_dead_worker_is_reported_missing() {
        let handler = |_: WorkerRequest| -> WorkerReply { panic!("worker failure") };
        let mut pool = WorkerPool::with_handlers(vec![handler], Duration::from_millis(200)).unwrap();
        let replies = pool.dispatch(1, vec![batch(&[1])]);
        assert!(replies[0].is_none());
        // The thread is gone now; later steps degrade the same way without blocking.
        let replies = pool.dispatch(2, vec![batch(&[1])]);
        assert!(replies[0].is_none());
    }
}
