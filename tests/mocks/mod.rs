//! Mock pipeline collaborators for integration tests

#![allow(dead_code)]

pub mod mock_extractor;
pub mod mock_tagger;
pub mod recording_sink;

pub use mock_extractor::{MockExtractor, MockItem};
pub use mock_tagger::MockTagger;
pub use recording_sink::{Delivery, RecordingSink};
