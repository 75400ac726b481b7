//! Filesystem utilities for the V5 Brain.
//!
//! # Example
//!
//! ```ignore
//! use talos::fs::logger;
//! use log::{info, LevelFilter};
//!
//! logger::init(LevelFilter::Debug).expect("Failed to initialize logger");
//! info!("Robot initialized successfully");
//! ```

/// Logging to the console and `log.txt` on the SD card.
pub mod logger;
