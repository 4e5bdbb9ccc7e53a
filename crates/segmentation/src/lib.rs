//! Customer segmentation.
//!
//! Groups customers by recency, frequency and monetary value with seeded
//! k-means on standardised features, then renumbers the groups so that segment
//! rank follows average spend.

pub mod config;
pub mod kmeans;
pub mod scaler;
pub mod segmenter;

pub use config::SegmentationConfig;
pub use segmenter::{CustomerFeatureVector, CustomerSegmenter, SegmentAssignment, SegmentProfile};
