pub mod result;

pub use result::{TranscriptionResult, TranscriptionSegment};
