// src/error.rs
use core::fmt;

/// Library-wide error for rankdigest.
///
/// All errors surface synchronously at the call site; a failing operation
/// never leaves a digest partially mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestError {
    /// Argument outside its allowed range (q ∉ [0,1], q1 ≥ q2, NaN sample, ...).
    /// `context` pinpoints the offending argument.
    Domain { context: &'static str },

    /// A query that requires data was issued against an empty digest.
    /// `op` names the operation (e.g. "quantile", "mean").
    Empty { op: &'static str },

    /// Input had an incompatible shape (e.g. a JSON document whose fields
    /// have the wrong types).
    TypeMismatch { context: &'static str },

    /// Deserialization input was structurally valid but carried illegal
    /// values (non-finite means, non-positive weights, ...).
    Malformed { context: &'static str },
}

impl fmt::Display for DigestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DigestError::Domain { context } => write!(
                f,
                "rankdigest: argument out of domain ({}). \
hint: check the documented range for this operation",
                context
            ),
            DigestError::Empty { op } => write!(
                f,
                "rankdigest: {}() requires a non-empty digest. \
hint: ingest at least one value first",
                op
            ),
            DigestError::TypeMismatch { context } => {
                write!(f, "rankdigest: incompatible input shape ({})", context)
            }
            DigestError::Malformed { context } => write!(
                f,
                "rankdigest: malformed digest data ({}). \
hint: weights must be finite and > 0, means must not be NaN",
                context
            ),
        }
    }
}

impl std::error::Error for DigestError {}

pub type DigestResult<T> = Result<T, DigestError>;
