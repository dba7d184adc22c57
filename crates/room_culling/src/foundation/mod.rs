//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Math types and bounding volumes
//! - Arena collections
//! - Logging utilities

pub mod math;
pub mod collections;
pub mod logging;
