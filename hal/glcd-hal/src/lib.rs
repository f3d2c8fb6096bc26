//! glcd Hardware Abstraction Layer
//!
//! This crate defines the byte-level bus seen by the display driver and
//! the I2C port-expander implementation of it. The driver never talks to
//! I2C directly; it only writes and reads whole bytes on two named ports.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  glcd-drivers (KS0108 protocol)         │
//! └─────────────────────────────────────────┘
//!                     │  ByteBus
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  glcd-hal (this crate)                  │
//! │   Pcf8574Pair ── embedded_hal::i2c::I2c │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ PCF8574 data  │       │ PCF8574 ctrl  │
//! │   D7..D0      │       │ RST CS2 CS1   │
//! │               │       │ E  RW  RS     │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`bus::ByteBus`] - Byte writes/reads on the data and control ports

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod bus;
pub mod i2c;

// Re-export key items at crate root for convenience
pub use bus::{ByteBus, Port};
pub use i2c::{AddressError, ExpanderAddresses, Pcf8574Pair};
