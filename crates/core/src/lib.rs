//! `permkit-core`: outcome model and error taxonomy shared by every layer.
//!
//! Outcomes are inert data and errors are plain classifications. Composition
//! lives in `permkit-auth`.

pub mod deps;
pub mod error;
pub mod outcome;

pub use deps::Deps;
pub use error::{
    CheckError, CheckResult, CompositionError, ResolveError, ResolveErrorKind, fail, skip,
};
pub use outcome::CheckOutcome;
