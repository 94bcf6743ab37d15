//! Background palette computation.
//!
//! Each request takes the next generation number and runs on tokio's
//! blocking pool. A job keeps polling the shared generation counter and
//! aborts once a newer request exists; anything that still arrives with an
//! old generation is dropped on the receiving side.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use eyecolor_core::quantize::{QuantizeOptions, quantize_cancellable};
use eyecolor_core::{EyeColorError, SourceImage};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::events::PaletteUpdate;

pub struct PaletteWorker {
    runtime: Handle,
    /// Generation of the most recent request. Zero means none yet.
    generation: Arc<AtomicU64>,
    tx: mpsc::UnboundedSender<PaletteUpdate>,
    rx: mpsc::UnboundedReceiver<PaletteUpdate>,
}

impl PaletteWorker {
    pub fn new(runtime: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            runtime,
            generation: Arc::new(AtomicU64::new(0)),
            tx,
            rx,
        }
    }

    /// Start quantizing `image`, superseding any request in flight.
    /// Returns the new request's generation.
    pub fn request(&self, image: Arc<SourceImage>, options: QuantizeOptions) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let latest = Arc::clone(&self.generation);
        let tx = self.tx.clone();
        tracing::debug!(
            "palette request {generation} queued ({}x{}, {} colors)",
            image.width(),
            image.height(),
            options.max_colors
        );

        self.runtime.spawn_blocking(move || {
            let result = quantize_cancellable(&image, &options, || {
                latest.load(Ordering::Acquire) == generation
            });
            if matches!(result, Err(EyeColorError::Cancelled)) {
                tracing::debug!("palette request {generation} superseded");
                return;
            }
            // The receiver only disappears with the worker itself.
            let _ = tx.send(PaletteUpdate { generation, result });
        });
        generation
    }

    /// Invalidate every request in flight without starting a new one.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Generation of the most recent request or cancellation.
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.current_generation() == generation
    }

    /// Next current update, if one has already arrived.
    pub fn try_next(&mut self) -> Option<PaletteUpdate> {
        while let Ok(update) = self.rx.try_recv() {
            if self.is_current(update.generation) {
                return Some(update);
            }
            tracing::debug!("dropping stale palette result {}", update.generation);
        }
        None
    }

    /// Wait for the result of the most recent request.
    ///
    /// Never resolves when that request was cancelled; callers track whether
    /// a request is outstanding.
    pub async fn next(&mut self) -> Option<PaletteUpdate> {
        while let Some(update) = self.rx.recv().await {
            if self.is_current(update.generation) {
                return Some(update);
            }
            tracing::debug!("dropping stale palette result {}", update.generation);
        }
        None
    }
}
