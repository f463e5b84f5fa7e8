//! Video module

pub mod frames;

pub use frames::{FrameError, FrameExtractor, FrameOptions};
