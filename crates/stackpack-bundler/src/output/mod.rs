//! Build output on disk.

pub mod writer;

pub use writer::{empty_dir, write_bundle};
