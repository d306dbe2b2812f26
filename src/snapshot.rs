//! Binary snapshot files
//!
//! A file is a flat sequence of native-endian `f64`. Each record is
//!
//! ```text
//! [time, cfl, g, n + 2, v_0, ..., v_{n+1}]
//! ```
//!
//! holding one variable on the padded grid. Records come in `(h, hu)` pairs,
//! one pair per checkpoint; the last pair is the final solution.

use std::{
    fs,
    io::{self, Read, Write},
    path::Path,
};

use bytemuck::cast_slice;
use thiserror::Error;

/// Fields before the values of a record: time, CFL, g, cell count.
pub const PARAMETER_COUNT: usize = 4;
/// Variables per checkpoint: h, hu.
pub const VARIABLE_COUNT: usize = 2;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("snapshot i/o error")]
    Io(#[from] io::Error),
    #[error("snapshot data is empty")]
    Empty,
    #[error("data file inconsistent: {0} bytes is not a whole number of 8-byte floats")]
    Truncated(usize),
    #[error("data file inconsistent: invalid cell count field {0}")]
    InvalidCellCount(f64),
    #[error("data file inconsistent: invalid time stamp {0}")]
    InvalidTime(f64),
    #[error("data file inconsistent: {values} values do not split into (h, hu) records of {stride} values")]
    Inconsistent { values: usize, stride: usize },
}

/// Appends one record to `output`.
pub fn write_record<W: Write>(
    mut output: W,
    time: f64,
    cfl: f64,
    gravity: f64,
    values: &[f64],
) -> io::Result<()> {
    let header = [time, cfl, gravity, values.len() as f64];
    output.write_all(cast_slice::<f64, u8>(&header))?;
    output.write_all(cast_slice::<f64, u8>(values))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub time: f64,
    pub cfl: f64,
    pub gravity: f64,
    /// Padded values, ghost cells included.
    pub values: Vec<f64>,
}

impl Snapshot {
    pub fn interior(&self) -> &[f64] {
        &self.values[1..self.values.len() - 1]
    }
}

/// All records of a snapshot file, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotSeries {
    padded_cells: usize,
    records: Vec<Snapshot>,
}

impl SnapshotSeries {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let file = fs::File::open(path)?;
        Self::read_from(io::BufReader::new(file))
    }

    pub fn read_from<R: Read>(mut input: R) -> Result<Self, SnapshotError> {
        let mut bytes = Vec::new();
        input.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let width = std::mem::size_of::<f64>();
        if bytes.len() % width != 0 {
            return Err(SnapshotError::Truncated(bytes.len()));
        }
        let data: Vec<f64> = bytes
            .chunks_exact(width)
            .map(bytemuck::pod_read_unaligned::<f64>)
            .collect();
        Self::from_values(&data)
    }

    pub fn from_values(data: &[f64]) -> Result<Self, SnapshotError> {
        if data.len() < PARAMETER_COUNT {
            return Err(SnapshotError::Empty);
        }

        let field = data[3];
        let available = (data.len() - PARAMETER_COUNT) as f64;
        if !(field >= 3.0) || field.fract() != 0.0 || !(field <= available) {
            return Err(SnapshotError::InvalidCellCount(field));
        }
        let padded_cells = field as usize;

        let stride = padded_cells + PARAMETER_COUNT;
        if data.len() % (stride * VARIABLE_COUNT) != 0 {
            return Err(SnapshotError::Inconsistent {
                values: data.len(),
                stride,
            });
        }

        let mut records = Vec::with_capacity(data.len() / stride);
        for row in data.chunks_exact(stride) {
            if row[3] != field {
                return Err(SnapshotError::InvalidCellCount(row[3]));
            }
            if !row[0].is_finite() {
                return Err(SnapshotError::InvalidTime(row[0]));
            }
            records.push(Snapshot {
                time: row[0],
                cfl: row[1],
                gravity: row[2],
                values: row[PARAMETER_COUNT..].to_vec(),
            });
        }

        Ok(Self {
            padded_cells,
            records,
        })
    }

    /// Interior cell count `n`, read from the first record.
    pub fn cells(&self) -> usize {
        self.padded_cells - 2
    }

    pub fn records(&self) -> &[Snapshot] {
        &self.records
    }

    /// `(h, hu)` pairs in file order.
    pub fn checkpoints(&self) -> impl Iterator<Item = (&Snapshot, &Snapshot)> {
        self.records
            .chunks_exact(VARIABLE_COUNT)
            .map(|pair| (&pair[0], &pair[1]))
    }

    fn last_pair(&self) -> (&Snapshot, &Snapshot) {
        let n = self.records.len();
        (&self.records[n - 2], &self.records[n - 1])
    }

    /// Time stamp of the last record.
    pub fn final_time(&self) -> f64 {
        self.last_pair().1.time
    }

    pub fn final_height(&self) -> &[f64] {
        self.last_pair().0.interior()
    }

    pub fn final_momentum(&self) -> &[f64] {
        self.last_pair().1.interior()
    }

    /// Cell centers `x_i = (i + 1/2) / n` on the unit interval, as plotted from a file.
    pub fn unit_centers(&self) -> Vec<f64> {
        let n = self.cells() as f64;
        (0..self.cells()).map(|i| (i as f64 + 0.5) / n).collect()
    }
}
