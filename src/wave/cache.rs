//! Shared waveform cache handle.
//!
//! The pyramid for a loaded buffer is built on a worker thread and
//! published through this handle. The lock around the handle is held
//! only to clone or swap an `Arc`, never while building, and the render
//! path reads through a try-lock: if a swap is in flight the frame
//! simply draws without waveform data instead of stalling.

use super::{SampleBuffer, WaveformPyramid};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use tracing::debug;

/// Holds the latest completed waveform pyramid.
///
/// Rebuilds are asynchronous: each request takes a ticket, and a build
/// finishing with a stale ticket (because a newer buffer was loaded in
/// the meantime) is discarded instead of applied.
#[derive(Debug, Default)]
pub struct WaveformCache {
    /// Latest completed pyramid, if any.
    current: Mutex<Option<Arc<WaveformPyramid>>>,
    /// Ticket of the most recent rebuild request.
    build_id: AtomicU64,
}

impl WaveformCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a rebuild for a buffer on a worker thread.
    ///
    /// The previous pyramid stays readable until the new one swaps in.
    /// Requesting another rebuild before this one finishes invalidates
    /// it; the stale result is dropped on completion.
    pub fn rebuild(self: &Arc<Self>, buffer: Arc<SampleBuffer>) {
        let ticket = self.next_ticket();
        let cache = Arc::clone(self);

        thread::spawn(move || {
            debug!(
                frames = buffer.frame_count(),
                channels = buffer.channel_count(),
                "building waveform pyramid"
            );
            let pyramid = Arc::new(WaveformPyramid::build(&buffer));
            cache.apply(ticket, pyramid);
        });
    }

    /// Returns the current pyramid without blocking.
    ///
    /// None while the cache is empty or momentarily contended by a swap.
    pub fn snapshot(&self) -> Option<Arc<WaveformPyramid>> {
        self.current.try_lock().ok().and_then(|guard| guard.clone())
    }

    /// Drops the current pyramid and invalidates any in-flight build.
    pub fn clear(&self) {
        self.next_ticket();
        if let Ok(mut current) = self.current.lock() {
            *current = None;
        }
    }

    /// Takes the next build ticket, invalidating all earlier ones.
    fn next_ticket(&self) -> u64 {
        self.build_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Publishes a finished pyramid if its ticket is still current.
    fn apply(&self, ticket: u64, pyramid: Arc<WaveformPyramid>) {
        if let Ok(mut current) = self.current.lock() {
            // Re-checked under the lock so two finishing builds cannot
            // publish out of order.
            if self.build_id.load(Ordering::SeqCst) == ticket {
                *current = Some(pyramid);
            } else {
                debug!("discarding stale waveform build");
            }
        }
    }
}
