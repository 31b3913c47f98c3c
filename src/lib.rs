//! Draft-board scan enrichment pipeline.
//!
//! Captures the draft screen, recognizes its ability slots through a
//! local classification server, enriches the recognized names with
//! scraped statistics, and emits ranked, synergy-aware suggestions.
//! Rescans reuse the previous frame to skip recognition on slots that
//! did not change.

pub mod error;
pub mod logging;
pub mod models;
pub mod services;

pub use error::{CaptureError, ClassifierError, RepositoryError, Result, ScanError};
pub use models::config::ScanConfig;
pub use models::payload::{ScanMode, ScanPayload, ScanResult};
pub use models::region::RegionManifest;
pub use services::scanner::{DraftScanner, ScanState};
