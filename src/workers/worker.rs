use super::snapshot::{Correction, ObjectSnapshot, WorkerReply, WorkerRequest};
use crate::collision::CollisionEvent;
use crate::config::CollisionConfig;
use crate::error::Result;
use crate::world::CollisionManager;
use std::sync::mpsc::{Receiver, Sender};
use tracing::{debug, trace};

/// The private pipeline one worker thread runs: its own hash, solver and pair set,
/// rebuilt from scratch for every request.
pub struct CollisionWorker {
    index: usize,
    manager: CollisionManager<ObjectSnapshot, Vec<CollisionEvent>>,
}

impl CollisionWorker {
    /// Builds the worker pipeline from `config.for_worker()`.
    pub fn new(index: usize, config: &CollisionConfig) -> Result<Self> {
        Ok(Self {
            index,
            manager: CollisionManager::with_sink(config.for_worker(), Vec::new())?,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Runs every pass over the batch and reports the final center of mass of each
    /// object plus the events raised along the way. Only pairs anchored in the
    /// request's region are resolved.
    pub fn process(&mut self, request: WorkerRequest) -> WorkerReply {
        self.manager.clear();
        self.manager.sink_mut().clear();
        if request.objects.is_empty() {
            return WorkerReply::empty(request.step, self.index);
        }

        self.manager.set_pair_region(request.region);
        for snapshot in request.objects {
            self.manager.add(snapshot);
        }
        let stats = self.manager.check_collisions();
        let corrections = self
            .manager
            .iter()
            .map(|o| Correction {
                id: o.id,
                center_of_mass: o.center_of_mass,
            })
            .collect();
        let events = std::mem::take(self.manager.sink_mut());
        trace!(worker = self.index, step = request.step, objects = self.manager.len(), "batch processed");

        WorkerReply {
            step: request.step,
            worker: self.index,
            corrections,
            events,
            stats,
        }
    }
}

/// Worker thread body: answers requests until either channel closes.
///
/// Only the newest queued request is handled; older ones belong to steps the
/// coordinator has already given up on.
pub(crate) fn serve<F>(
    index: usize,
    mut handler: F,
    requests: Receiver<WorkerRequest>,
    replies: Sender<WorkerReply>,
) where
    F: FnMut(WorkerRequest) -> WorkerReply,
{
    while let Ok(mut request) = requests.recv() {
        let mut skipped = 0usize;
        while let Ok(newer) = requests.try_recv() {
            request = newer;
            skipped += 1;
        }
        if skipped > 0 {
            trace!(worker = index, skipped, step = request.step, "dropped superseded requests");
        }
        if replies.send(handler(request)).is_err() {
            break;
        }
    }
    debug!(worker = index, "collision worker exiting");
}
