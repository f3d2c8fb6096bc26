//! Graphic LCD driver implementations
//!
//! This crate provides the concrete driver for the KS0108-style
//! dual-controller 128x64 panel wired through a pair of PCF8574 port
//! expanders, built on the traits and types of `glcd-core`:
//!
//! - Bus protocol adapter (control-line shadow, strobe, busy wait)
//! - Dual-controller address space (page/column addressing, cursor)
//! - Primitive renderer (pixels, lines, rectangles, bitmaps, text)
//! - Compiled-in fonts
//! - A simulated controller pair for host-side tests (`sim` feature)

#![cfg_attr(not(any(test, feature = "sim")), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod fonts;
pub mod ks0108;
#[cfg(any(test, feature = "sim"))]
pub mod sim;

pub use ks0108::Ks0108;
