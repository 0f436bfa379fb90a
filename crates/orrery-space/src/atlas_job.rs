//! Background atlas construction.
//!
//! One worker thread builds (or fetches from the shared cache) the planet
//! atlas and delivers it over a bounded channel. The frame loop polls without
//! blocking. Cancelling before delivery guarantees the result is never handed
//! to a scene whose GPU resources are already gone.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, TryRecvError, bounded};
use orrery_planet::{Atlas, AtlasCache, AtlasOptions, PlanetError, SharedAtlasCache};

pub type AtlasResult = Result<Arc<Atlas>, PlanetError>;

/// A single in-flight atlas build.
pub struct AtlasJob {
    receiver: Receiver<AtlasResult>,
    cancelled: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    delivered: bool,
}

impl AtlasJob {
    /// Start building `options` on a new thread, going through `cache`.
    pub fn spawn(cache: SharedAtlasCache, options: AtlasOptions) -> std::io::Result<Self> {
        let (sender, receiver) = bounded::<AtlasResult>(1);
        let cancelled = Arc::new(AtomicBool::new(false));
        let worker_cancelled = Arc::clone(&cancelled);

        let handle = std::thread::Builder::new()
            .name("atlas-builder".into())
            .spawn(move || {
                // Check cancellation before starting work.
                if worker_cancelled.load(Ordering::Acquire) {
                    return;
                }
                let start = std::time::Instant::now();
                let result = AtlasCache::fetch_shared(&cache, &options);

                // Check cancellation after generation.
                if worker_cancelled.load(Ordering::Acquire) {
                    log::debug!("Atlas job cancelled after build, discarding result");
                    return;
                }
                log::debug!("Atlas job finished in {:?}", start.elapsed());
                let _ = sender.send(result);
            })?;

        Ok(Self {
            receiver,
            cancelled,
            handle: Some(handle),
            delivered: false,
        })
    }

    /// The finished atlas, once. `None` while building, after cancellation,
    /// and after the result has been taken.
    pub fn poll(&mut self) -> Option<AtlasResult> {
        if self.delivered || self.is_cancelled() {
            return None;
        }
        match self.receiver.try_recv() {
            Ok(result) => {
                self.delivered = true;
                self.reap();
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                // Worker exited without sending: cancelled or panicked.
                self.delivered = true;
                self.reap();
                None
            }
        }
    }

    /// Block until the job finishes and return its result.
    pub fn wait(mut self) -> Option<AtlasResult> {
        if self.is_cancelled() {
            return None;
        }
        let result = self.receiver.recv().ok();
        self.delivered = true;
        self.reap();
        result
    }

    /// Ask the worker to discard its result. The thread is not joined.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn is_finished(&self) -> bool {
        self.delivered || self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    fn reap(&mut self) {
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            log::error!("Atlas builder thread panicked");
        }
    }
}

impl Drop for AtlasJob {
    fn drop(&mut self) {
        if !self.delivered {
            self.cancel();
        }
    }
}
