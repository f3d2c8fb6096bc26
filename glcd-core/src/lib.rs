//! Board-agnostic core logic for the dual-controller graphic LCD
//!
//! This crate contains everything that does not touch the bus:
//!
//! - Panel geometry and address translation (128x64, two 64x64 controllers)
//! - Control-line shadow value type
//! - Controller command encodings
//! - Font descriptors and glyph access
//! - Raster algorithms (Bresenham lines, rectangle outlines)
//! - Error taxonomy and handle state machine
//! - Configuration types
//! - The drawing API trait consumed by applications

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod config;
pub mod control;
pub mod error;
pub mod font;
pub mod geometry;
pub mod raster;
pub mod state;
pub mod traits;

pub use config::{ConfigError, DisplayConfig};
pub use control::ControlLines;
pub use error::DisplayError;
pub use font::{FontDescriptor, FontError, FontId, FontSet, Glyph};
pub use geometry::{Controller, PixelAddress, Point};
pub use state::HandleState;
