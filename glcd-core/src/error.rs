//! Driver error taxonomy
//!
//! Every failure is raised to the immediate caller. The driver does not
//! retry; after a bus failure or busy timeout the handle is faulted and
//! must be re-initialized.

use core::fmt::Debug;

use crate::geometry::Controller;

/// Errors raised by display operations
///
/// Generic over the bus error so callers can inspect the underlying
/// hardware failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError<E> {
    /// A byte write to the data or control port failed
    BusWrite(E),
    /// A byte read from the data port failed
    BusRead(E),
    /// Address, pixel, text cell or start line outside the panel
    InvalidCoordinate {
        /// Column, pixel x, text column or start line
        x: u16,
        /// Page, pixel y or text line (0 when not applicable)
        y: u16,
    },
    /// Text argument absent
    NullArgument,
    /// Busy flag never cleared within the poll limit
    BusyTimeout {
        /// Controller that stayed busy
        controller: Controller,
    },
    /// Bitmap source shorter than its declared extent
    BufferTooShort {
        /// Bytes needed
        required: usize,
        /// Bytes supplied
        provided: usize,
    },
    /// Handle used before `init`
    NotReady,
    /// Handle faulted by an earlier bus failure
    Faulted,
}

impl<E> DisplayError<E> {
    /// Shorthand for an out-of-range coordinate
    pub fn coordinate(x: impl Into<u16>, y: impl Into<u16>) -> Self {
        DisplayError::InvalidCoordinate {
            x: x.into(),
            y: y.into(),
        }
    }

    /// Whether this error leaves the handle faulted
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DisplayError::BusWrite(_) | DisplayError::BusRead(_) | DisplayError::BusyTimeout { .. }
        )
    }
}

impl<E: Debug> core::fmt::Display for DisplayError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DisplayError::BusWrite(e) => write!(f, "bus write failed: {e:?}"),
            DisplayError::BusRead(e) => write!(f, "bus read failed: {e:?}"),
            DisplayError::InvalidCoordinate { x, y } => {
                write!(f, "coordinate ({x}, {y}) out of range")
            }
            DisplayError::NullArgument => write!(f, "text argument missing"),
            DisplayError::BusyTimeout { controller } => {
                write!(f, "controller {} stayed busy", controller.index())
            }
            DisplayError::BufferTooShort { required, provided } => {
                write!(f, "bitmap needs {required} bytes, got {provided}")
            }
            DisplayError::NotReady => write!(f, "display not initialized"),
            DisplayError::Faulted => write!(f, "display faulted, re-initialize"),
        }
    }
}

impl<E: Debug> core::error::Error for DisplayError<E> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(DisplayError::BusWrite(()).is_fatal());
        assert!(DisplayError::BusRead(()).is_fatal());
        assert!(DisplayError::<()>::BusyTimeout {
            controller: Controller::Right
        }
        .is_fatal());
        assert!(!DisplayError::<()>::coordinate(128u8, 0u8).is_fatal());
        assert!(!DisplayError::<()>::NullArgument.is_fatal());
    }

    #[test]
    fn test_display_messages() {
        let err = DisplayError::<()>::coordinate(200u8, 9u8);
        assert_eq!(err.to_string(), "coordinate (200, 9) out of range");

        let err = DisplayError::<()>::BufferTooShort {
            required: 64,
            provided: 10,
        };
        assert_eq!(err.to_string(), "bitmap needs 64 bytes, got 10");
    }
}
