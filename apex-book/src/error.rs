//! Typed error surface for `apex-book`, per the VALIDATION error kind in the
//! error-handling design: parsing routines report a typed error to the
//! caller rather than throwing past the API boundary.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BookError {
    #[error("invalid decimal string {input:?}: {reason}")]
    InvalidDecimal { input: String, reason: String },
}
