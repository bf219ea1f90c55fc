//! Utility functions and helpers.

pub mod fs;
pub mod log;
pub mod size;
pub mod template;
