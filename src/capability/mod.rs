//! Alignment Capability
//!
//! The engine never knows how a unit is processed. Hosts hand it an
//! [`Aligner`] at construction time; the engine only calls the two
//! operations below.
//!
//! # Example
//!
//! ```rust
//! use chunkrunner::capability::{Aligner, FnAligner};
//!
//! let aligner = FnAligner::new(
//!     |unit: &String| Ok(vec![unit.to_uppercase()]),
//!     |_records: &[String]| Ok(()),
//! );
//!
//! let records = aligner.align(&"acgt".to_string()).unwrap();
//! assert_eq!(records, vec!["ACGT".to_string()]);
//! ```

use std::marker::PhantomData;

use crate::execution::error::UnitError;

/// Host-supplied processing for one kind of work unit.
///
/// Implementations must tolerate concurrent calls from several worker
/// threads; the engine takes no locks around them.
pub trait Aligner<U> {
    /// Result element produced for a unit.
    type Record;

    /// Processes one unit and returns its records in order.
    fn align(&self, unit: &U) -> Result<Vec<Self::Record>, UnitError>;

    /// Side-effecting hook given the records just produced for one unit.
    fn cleanup(&self, records: &[Self::Record]) -> Result<(), UnitError>;
}

impl<U, A> Aligner<U> for &A
where
    A: Aligner<U> + ?Sized,
{
    type Record = A::Record;

    fn align(&self, unit: &U) -> Result<Vec<Self::Record>, UnitError> {
        (**self).align(unit)
    }

    fn cleanup(&self, records: &[Self::Record]) -> Result<(), UnitError> {
        (**self).cleanup(records)
    }
}

/// Adapts a pair of closures into an [`Aligner`].
pub struct FnAligner<U, R, F, C> {
    align: F,
    cleanup: C,
    _marker: PhantomData<fn(&U) -> R>,
}

impl<U, R, F, C> FnAligner<U, R, F, C>
where
    F: Fn(&U) -> Result<Vec<R>, UnitError>,
    C: Fn(&[R]) -> Result<(), UnitError>,
{
    /// Creates an aligner from an `align` closure and a `cleanup` closure.
    pub fn new(align: F, cleanup: C) -> Self {
        Self {
            align,
            cleanup,
            _marker: PhantomData,
        }
    }
}

impl<U, R, F, C> Aligner<U> for FnAligner<U, R, F, C>
where
    F: Fn(&U) -> Result<Vec<R>, UnitError>,
    C: Fn(&[R]) -> Result<(), UnitError>,
{
    type Record = R;

    fn align(&self, unit: &U) -> Result<Vec<R>, UnitError> {
        (self.align)(unit)
    }

    fn cleanup(&self, records: &[R]) -> Result<(), UnitError> {
        (self.cleanup)(records)
    }
}
