//! Height field grid and the normalization stage.
//!
//! A [`HeightField`] is a dense row-major `rows x cols` grid of heights.
//! [`normalize`] orients it so that `rows >= cols`, shifts its minimum to
//! zero and applies the height scale. Everything downstream works on the
//! normalized field.

use tracing::debug;

use crate::error::{ReliefError, ReliefResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A dense, rectangular grid of heights.
///
/// # Example
///
/// ```
/// use mesh_relief::HeightField;
///
/// let field = HeightField::from_rows(vec![vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap();
/// assert_eq!(field.dims(), (2, 2));
/// assert_eq!(field.get(0, 1), Some(1.0));
///
/// // Ragged input is rejected
/// assert!(HeightField::from_rows(vec![vec![0.0], vec![1.0, 2.0]]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HeightField {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl HeightField {
    /// Create a field from row-major data.
    ///
    /// # Errors
    ///
    /// Returns [`ReliefError::EmptyField`] if either dimension is zero and
    /// [`ReliefError::InvalidShape`] if `data.len() != rows * cols`.
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> ReliefResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(ReliefError::EmptyField);
        }
        if rows.checked_mul(cols) != Some(data.len()) {
            return Err(ReliefError::invalid_shape(
                format!("{rows} x {cols} = {} values", rows.saturating_mul(cols)),
                format!("{} values", data.len()),
            ));
        }
        Ok(Self { rows, cols, data })
    }

    /// Create a field from nested rows.
    ///
    /// # Errors
    ///
    /// Returns an error for empty input or rows of differing lengths.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> ReliefResult<Self> {
        let row_count = rows.len();
        let cols = rows.first().map_or(0, Vec::len);
        if let Some((index, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(ReliefError::invalid_shape(
                format!("{cols} columns in every row"),
                format!("{} columns in row {index}", row.len()),
            ));
        }
        let data = rows.into_iter().flatten().collect();
        Self::new(row_count, cols, data)
    }

    /// Create a field from an n-dimensional array description.
    ///
    /// Only rank-2 shapes are accepted; a channel axis must be reduced
    /// before the data reaches the mesh pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`ReliefError::InvalidShape`] for any rank other than 2.
    pub fn from_shape(shape: &[usize], data: Vec<f64>) -> ReliefResult<Self> {
        match *shape {
            [rows, cols] => Self::new(rows, cols, data),
            _ => Err(ReliefError::invalid_shape(
                "a 2-dimensional array",
                format!("{}-dimensional shape {shape:?}", shape.len()),
            )),
        }
    }

    /// Number of rows.
    #[inline]
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    #[inline]
    #[must_use]
    pub const fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Height at `(row, col)`, or `None` when out of range.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            self.data.get(row * self.cols + col).copied()
        } else {
            None
        }
    }

    /// Height at `(row, col)`; callers guarantee the indices are in range.
    #[inline]
    pub(crate) fn at(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    /// One row as a slice.
    #[inline]
    #[cfg_attr(not(feature = "native"), allow(dead_code))]
    pub(crate) fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Row-major view of all heights.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Smallest height.
    #[must_use]
    pub fn min(&self) -> f64 {
        self.data.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Largest height.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.data.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Rotate a quarter turn clockwise (three counter-clockwise turns).
    ///
    /// A `rows x cols` field becomes `cols x rows`; the first output row is
    /// the first input column read from bottom to top.
    #[must_use]
    pub fn rotate_clockwise(&self) -> Self {
        let (rows, cols) = (self.cols, self.rows);
        let mut data = Vec::with_capacity(self.data.len());
        for i in 0..rows {
            for j in 0..cols {
                data.push(self.at(self.rows - 1 - j, i));
            }
        }
        Self { rows, cols, data }
    }

    fn first_non_finite(&self) -> Option<(usize, usize)> {
        self.data
            .iter()
            .position(|v| !v.is_finite())
            .map(|i| (i / self.cols, i % self.cols))
    }
}

/// Orient and rescale a raw height field.
///
/// When the field has at least as many columns as rows it is rotated a
/// quarter turn clockwise so the result always has `rows >= cols`. The
/// global minimum is then subtracted from every cell and the result is
/// multiplied by `scale`.
///
/// # Errors
///
/// Returns [`ReliefError::NonFiniteHeight`] if any height is NaN or infinite.
///
/// # Example
///
/// ```
/// use mesh_relief::{HeightField, normalize};
///
/// let raw = HeightField::from_rows(vec![vec![10.0, 12.0, 14.0]]).unwrap();
/// let field = normalize(&raw, 0.5).unwrap();
///
/// assert_eq!(field.dims(), (3, 1));
/// assert_eq!(field.as_slice(), &[0.0, 1.0, 2.0]);
/// ```
pub fn normalize(field: &HeightField, scale: f64) -> ReliefResult<HeightField> {
    if let Some((row, col)) = field.first_non_finite() {
        return Err(ReliefError::NonFiniteHeight { row, col });
    }

    let mut oriented = if field.cols >= field.rows {
        debug!(
            "Rotating {}x{} field to landscape orientation",
            field.rows, field.cols
        );
        field.rotate_clockwise()
    } else {
        field.clone()
    };

    let min = oriented.min();
    for value in &mut oriented.data {
        *value = (*value - min) * scale;
    }

    Ok(oriented)
}
