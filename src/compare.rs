//! L1 errors between a solution and a reference solution.
//!
//! Both are snapshot series; only their final checkpoints are compared, over
//! the interior cells. The comparison is only meaningful on the same grid at
//! the same time, anything else is reported as a mismatch.

use std::{fmt, path::Path};

use thiserror::Error;

use crate::snapshot::{SnapshotError, SnapshotSeries};

#[derive(Error, Debug)]
pub enum CompareError {
    #[error("solution and reference solution have different number of grid cells ({candidate} vs {reference})")]
    CellCountMismatch { candidate: usize, reference: usize },
    #[error("cannot compare solution at different times ({candidate} vs {reference})")]
    TimeMismatch { candidate: f64, reference: f64 },
    #[error("reference water height sums to {0}, relative error is undefined")]
    DryReference(f64),
    #[error("could not read {path}")]
    Snapshot {
        path: String,
        #[source]
        source: SnapshotError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorReport {
    pub time: f64,
    pub cells: usize,
    /// `100 * Σ|h - h_ref| / Σ|h_ref|`
    pub relative_height: f64,
    /// `100 * Σ|h - h_ref| / n`
    ///
    /// Computed from the *height* difference, not from `hu`, so that numbers stay
    /// comparable with previously published reference errors.
    pub absolute_momentum: f64,
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "relative L1-error of water height h(t={:.5}) is {:.5}%",
            self.time, self.relative_height
        )?;
        write!(
            f,
            "absolute L1-error of momentum hu(t={:.5}) is {:.5}%",
            self.time, self.absolute_momentum
        )
    }
}

pub fn compare(
    candidate: &SnapshotSeries,
    reference: &SnapshotSeries,
) -> Result<ErrorReport, CompareError> {
    if candidate.cells() != reference.cells() {
        return Err(CompareError::CellCountMismatch {
            candidate: candidate.cells(),
            reference: reference.cells(),
        });
    }

    let (time, reference_time) = (candidate.final_time(), reference.final_time());
    if time != reference_time {
        return Err(CompareError::TimeMismatch {
            candidate: time,
            reference: reference_time,
        });
    }

    let h = candidate.final_height();
    let h_ref = reference.final_height();
    let difference: f64 = h.iter().zip(h_ref).map(|(a, b)| (a - b).abs()).sum();
    let magnitude: f64 = h_ref.iter().map(|b| b.abs()).sum();
    if !(magnitude > 0.0) || !magnitude.is_finite() {
        return Err(CompareError::DryReference(magnitude));
    }
    let cells = candidate.cells();

    Ok(ErrorReport {
        time,
        cells,
        relative_height: 100.0 * difference / magnitude,
        absolute_momentum: 100.0 * difference / cells as f64,
    })
}

pub fn compare_files(
    candidate: impl AsRef<Path>,
    reference: impl AsRef<Path>,
) -> Result<ErrorReport, CompareError> {
    let open = |path: &Path| {
        SnapshotSeries::open(path).map_err(|source| CompareError::Snapshot {
            path: path.display().to_string(),
            source,
        })
    };

    compare(&open(candidate.as_ref())?, &open(reference.as_ref())?)
}
