//! Dataset loading and seeded sample-data generation.

pub mod generator;
pub mod loader;

pub use generator::SampleGenerator;
pub use loader::{load_all, Dataset, LoadError};
