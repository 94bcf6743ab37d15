//! Eyecolor Session — the stateful layer between a presenter and the core.
//!
//! [`MeasurementSession`] is the single writer of the loaded image, face
//! points, viewport and palette. Quantization runs on a background
//! [`PaletteWorker`]; only the result of the most recent request is ever
//! applied.

pub mod error;
pub mod events;
pub mod session;
pub mod worker;

pub use error::SessionError;
pub use events::{MeasureTarget, PaletteMarker, PaletteUpdate, palette_marker_size};
pub use session::{MeasurementSession, SessionConfig};
pub use worker::PaletteWorker;
