//! Occupancy and edge masks over the height field lattice.
//!
//! The tessellator records which lattice vertices belong to an emitted top
//! facet in an [`OccupancyMask`]. The shell stage turns that into an
//! [`EdgeMask`] marking the rim of the included region, which is where walls
//! are pulled down to the floor.

// Lattice indices round-trip through f64 coordinates; grids beyond 2^52 cells are not practical
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

/// Boolean `rows x cols` grid of lattice vertices touched by a top facet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyMask {
    rows: usize,
    cols: usize,
    cells: Vec<bool>,
}

impl OccupancyMask {
    /// Create an empty mask.
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![false; rows * cols],
        }
    }

    /// `(rows, cols)`.
    #[must_use]
    pub const fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Mark a lattice vertex as occupied. Out-of-range indices are ignored.
    pub fn mark(&mut self, row: usize, col: usize) {
        if row < self.rows && col < self.cols {
            self.cells[row * self.cols + col] = true;
        }
    }

    /// Whether a lattice vertex is occupied.
    #[must_use]
    pub fn is_occupied(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols && self.cells[row * self.cols + col]
    }

    /// Number of occupied vertices.
    #[must_use]
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Occupied neighbours in the 3x3 block around `(row, col)`, the vertex
    /// itself included. Indices wrap modulo the grid dimensions, so the first
    /// and last rows (and columns) are neighbours of each other.
    fn wrapped_neighbourhood_sum(&self, row: usize, col: usize) -> usize {
        let mut sum = 0;
        for dr in [self.rows - 1, 0, 1] {
            for dc in [self.cols - 1, 0, 1] {
                let r = (row + dr) % self.rows;
                let c = (col + dc) % self.cols;
                if self.cells[r * self.cols + c] {
                    sum += 1;
                }
            }
        }
        sum
    }
}

/// Boolean grid of lattice vertices on the rim of the included region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeMask {
    rows: usize,
    cols: usize,
    cells: Vec<bool>,
}

impl EdgeMask {
    /// Derive the rim from an occupancy mask.
    ///
    /// A vertex is an edge when its wrapped 3x3 neighbourhood holds between one
    /// and eight occupied vertices. Every vertex on the outermost rows and
    /// columns is an edge regardless.
    ///
    /// Only frame vertices have wrapped neighbours, and the frame is always an
    /// edge, so the wrap never changes the result.
    #[must_use]
    pub fn from_occupancy(occupancy: &OccupancyMask) -> Self {
        let (rows, cols) = occupancy.dims();
        let mut cells = vec![false; rows * cols];

        for row in 0..rows {
            for col in 0..cols {
                let on_frame = row == 0 || col == 0 || row + 1 == rows || col + 1 == cols;
                let sum = occupancy.wrapped_neighbourhood_sum(row, col);
                cells[row * cols + col] = on_frame || (sum != 0 && sum != 9);
            }
        }

        Self { rows, cols, cells }
    }

    /// `(rows, cols)`.
    #[must_use]
    pub const fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Whether the lattice vertex `(row, col)` is an edge.
    #[must_use]
    pub fn is_edge(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols && self.cells[row * self.cols + col]
    }

    /// Number of edge vertices.
    #[must_use]
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Whether the centred point `(x, y)` sits on an edge lattice vertex.
    ///
    /// Lattice vertex `(i, k)` lives at `(i - rows/2, k - cols/2)`; points that
    /// do not land exactly on the lattice are never edges.
    #[must_use]
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        match (lattice_index(x, self.rows), lattice_index(y, self.cols)) {
            (Some(row), Some(col)) => self.is_edge(row, col),
            _ => false,
        }
    }
}

/// Centred coordinate of lattice index `index` along an axis of `len` vertices.
#[inline]
pub(crate) fn centred(index: usize, len: usize) -> f64 {
    index as f64 - len as f64 / 2.0
}

fn lattice_index(coord: f64, len: usize) -> Option<usize> {
    let index = coord + len as f64 / 2.0;
    if index.fract() != 0.0 || index < 0.0 || index >= len as f64 {
        return None;
    }
    Some(index as usize)
}
