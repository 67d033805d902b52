// Document cleaning rules: boundary analysis, noise span detection, and
// span merging. Everything here works in byte offsets into the raw
// document text.

pub mod boundary;
pub mod merge;
pub mod noise;

pub use boundary::BoundaryDetector;
pub use merge::{merge, merge_and_slice, normalize};
pub use noise::NoiseSpanCollector;
