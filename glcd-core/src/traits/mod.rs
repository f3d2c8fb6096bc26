//! Display abstraction traits
//!
//! These traits define the interface between hosting applications and
//! the panel driver.

pub mod display;

pub use display::{GraphicDisplay, GraphicDisplayExt};
