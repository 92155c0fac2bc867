//! Simple sparse matrix and least-squares conjugate gradient solver.
//!
//! This module provides a lightweight sparse matrix implementation (CSR format)
//! and CGLS, conjugate gradient on the normal equations `AᵗA x = Aᵗb` that
//! never forms `AᵗA`. Started from zero it converges to the minimum-norm
//! least-squares solution, so rank-deficient systems are handled without
//! any explicit inverse.

use nalgebra::DVector;

use crate::error::{Result, UnwrapError};

/// Compressed Sparse Row (CSR) matrix.
#[derive(Debug, Clone)]
pub struct CsrMatrix {
    rows: usize,
    cols: usize,
    /// `row_ptr[i]` is where row `i` starts in `col_idx`/`values`.
    /// Length is rows + 1, with `row_ptr[rows] = nnz`.
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<f64>,
}

impl CsrMatrix {
    /// Create a CSR matrix from triplets (row, col, value).
    ///
    /// Duplicate entries at the same (row, col) are summed.
    pub fn from_triplets(rows: usize, cols: usize, mut triplets: Vec<(usize, usize, f64)>) -> Self {
        triplets.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut row_counts = vec![0usize; rows];
        let mut col_idx = Vec::with_capacity(triplets.len());
        let mut values: Vec<f64> = Vec::with_capacity(triplets.len());
        let mut prev = None;

        for (row, col, val) in triplets {
            match values.last_mut() {
                Some(last) if prev == Some((row, col)) => *last += val,
                _ => {
                    col_idx.push(col);
                    values.push(val);
                    row_counts[row] += 1;
                    prev = Some((row, col));
                }
            }
        }

        let mut row_ptr = Vec::with_capacity(rows + 1);
        let mut acc = 0;
        row_ptr.push(acc);
        for count in row_counts {
            acc += count;
            row_ptr.push(acc);
        }

        Self {
            rows,
            cols,
            row_ptr,
            col_idx,
            values,
        }
    }

    /// Get the number of rows.
    #[inline]
    pub fn nrows(&self) -> usize {
        self.rows
    }

    /// Get the number of columns.
    #[inline]
    pub fn ncols(&self) -> usize {
        self.cols
    }

    /// Get the number of non-zero entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Multiply matrix by vector: y = A * x.
    pub fn mul_vec(&self, x: &DVector<f64>) -> DVector<f64> {
        debug_assert_eq!(x.len(), self.cols, "Vector dimension mismatch");

        let mut y = DVector::zeros(self.rows);
        for i in 0..self.rows {
            let mut sum = 0.0;
            for k in self.row_ptr[i]..self.row_ptr[i + 1] {
                sum += self.values[k] * x[self.col_idx[k]];
            }
            y[i] = sum;
        }
        y
    }

    /// Multiply the transpose by a vector: y = Aᵗ * x.
    pub fn mul_transpose_vec(&self, x: &DVector<f64>) -> DVector<f64> {
        debug_assert_eq!(x.len(), self.rows, "Vector dimension mismatch");

        let mut y = DVector::zeros(self.cols);
        for i in 0..self.rows {
            let xi = x[i];
            if xi == 0.0 {
                continue;
            }
            for k in self.row_ptr[i]..self.row_ptr[i + 1] {
                y[self.col_idx[k]] += self.values[k] * xi;
            }
        }
        y
    }
}

/// Solve `min |A x - b|` with CGLS.
///
/// Iterates until `|Aᵗ r| <= tolerance * |Aᵗ b|`, where `r` is the residual.
/// Returns the solution and the number of iterations used.
///
/// # Errors
///
/// [`UnwrapError::ConvergenceFailed`] if the tolerance is not reached within
/// `max_iter` iterations.
pub fn least_squares_cg(
    a: &CsrMatrix,
    b: &DVector<f64>,
    max_iter: usize,
    tolerance: f64,
) -> Result<(DVector<f64>, usize)> {
    debug_assert_eq!(a.nrows(), b.len(), "Matrix-vector dimension mismatch");

    let mut x = DVector::zeros(a.ncols());
    let mut r = b.clone();
    let mut s = a.mul_transpose_vec(&r);

    let threshold = tolerance * s.norm();
    let mut gamma = s.norm_squared();
    if gamma.sqrt() <= threshold || gamma == 0.0 {
        return Ok((x, 0));
    }

    let mut p = s.clone();

    for iter in 1..=max_iter {
        let q = a.mul_vec(&p);
        let q_norm_sq = q.norm_squared();
        if q_norm_sq == 0.0 {
            // p lies in the null space, which only happens once s vanished
            return Ok((x, iter));
        }
        let alpha = gamma / q_norm_sq;

        x.axpy(alpha, &p, 1.0);
        r.axpy(-alpha, &q, 1.0);

        s = a.mul_transpose_vec(&r);
        let new_gamma = s.norm_squared();
        if new_gamma.sqrt() <= threshold {
            return Ok((x, iter));
        }

        let beta = new_gamma / gamma;
        p = &s + beta * &p;
        gamma = new_gamma;
    }

    Err(UnwrapError::ConvergenceFailed {
        iterations: max_iter,
    })
}
