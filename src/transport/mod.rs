/// Filesystem helpers for catalog discovery and output files.
pub mod fs;
