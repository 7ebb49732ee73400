use std::ops::{Index, IndexMut};

use super::AlignmentError;

/// Dense row-major 2-D matrix with bounds-checked access
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Clone> DenseMatrix<T> {
    /// Create a `rows` x `cols` matrix with every cell set to `value`
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    /// Matrix with rows and columns swapped
    pub fn transpose(&self) -> Self {
        let mut data = Vec::with_capacity(self.data.len());
        for j in 0..self.cols {
            data.extend(self.column(j).cloned());
        }
        Self {
            rows: self.cols,
            cols: self.rows,
            data,
        }
    }
}

impl<T: Clone + Default> DenseMatrix<T> {
    /// Create a matrix filled with `T::default()`
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, T::default())
    }
}

impl<T> DenseMatrix<T> {
    /// Wrap a row-major buffer
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Result<Self, AlignmentError> {
        if data.len() != rows * cols {
            return Err(AlignmentError::DimensionMismatch(format!(
                "{} values cannot fill a {}x{} matrix",
                data.len(),
                rows,
                cols
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Build from nested rows; every row must have the same length
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, AlignmentError> {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(nrows * ncols);
        for (idx, row) in rows.into_iter().enumerate() {
            if row.len() != ncols {
                return Err(AlignmentError::RowLengthMismatch {
                    row: idx,
                    expected: ncols,
                    found: row.len(),
                });
            }
            data.extend(row);
        }
        Ok(Self {
            rows: nrows,
            cols: ncols,
            data,
        })
    }

    /// Number of rows
    pub fn nrows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn ncols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// True when the matrix has no cells
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    fn offset(&self, i: usize, j: usize) -> Option<usize> {
        (i < self.rows && j < self.cols).then(|| i * self.cols + j)
    }

    /// Cell `(i, j)`, or `None` when out of bounds
    pub fn get(&self, i: usize, j: usize) -> Option<&T> {
        self.offset(i, j).map(|o| &self.data[o])
    }

    /// Mutable cell `(i, j)`, or `None` when out of bounds
    pub fn get_mut(&mut self, i: usize, j: usize) -> Option<&mut T> {
        match self.offset(i, j) {
            Some(o) => Some(&mut self.data[o]),
            None => None,
        }
    }

    /// Row `i` as a slice
    pub fn row(&self, i: usize) -> &[T] {
        assert!(i < self.rows, "row {} out of bounds for {} rows", i, self.rows);
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Mutable row `i`
    pub fn row_mut(&mut self, i: usize) -> &mut [T] {
        assert!(i < self.rows, "row {} out of bounds for {} rows", i, self.rows);
        &mut self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Iterator over column `j`
    pub fn column(&self, j: usize) -> impl Iterator<Item = &T> + '_ {
        assert!(j < self.cols, "column {} out of bounds for {} columns", j, self.cols);
        self.data.iter().skip(j).step_by(self.cols.max(1)).take(self.rows)
    }

    /// Row-major view of every cell
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl DenseMatrix<f64> {
    /// Largest non-NaN value
    pub fn max(&self) -> Option<f64> {
        self.data
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .reduce(f64::max)
    }
}

impl<T> Index<(usize, usize)> for DenseMatrix<T> {
    type Output = T;

    fn index(&self, (i, j): (usize, usize)) -> &T {
        match self.offset(i, j) {
            Some(o) => &self.data[o],
            None => panic!(
                "index ({}, {}) out of bounds for {}x{} matrix",
                i, j, self.rows, self.cols
            ),
        }
    }
}

impl<T> IndexMut<(usize, usize)> for DenseMatrix<T> {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        match self.offset(i, j) {
            Some(o) => &mut self.data[o],
            None => panic!(
                "index ({}, {}) out of bounds for {}x{} matrix",
                i, j, self.rows, self.cols
            ),
        }
    }
}
