//! Download management: extraction, request orchestration and delivery

pub mod cookies;
pub mod error;
pub mod errors;
pub mod extractor;
pub mod pipeline;
pub mod scratch;
pub mod sink;

// Re-exports for convenience
pub use error::DownloadError;
pub use extractor::{ExtractedItem, Extractor, YtDlpExtractor};
pub use pipeline::{Pipeline, RequestOutcome, RequestState};
pub use scratch::ScratchFiles;
pub use sink::{AudioCaption, DeliverySink, DirectorySink};
