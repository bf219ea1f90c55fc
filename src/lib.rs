// src/lib.rs

//! Archive sharding pipeline library

pub mod error;
pub mod models;
pub mod pipeline;
pub mod stages;
pub mod utils;
