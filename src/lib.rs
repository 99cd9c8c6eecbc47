pub mod error;
pub mod geometry;
pub mod math;
pub mod operations;
pub mod params;
pub mod serialization;
pub mod stitching;
pub mod topology;

pub use error::{Result, SeamlineError};
