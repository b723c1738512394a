//! Bounded-row maximum contiguous submatrix.
//!
//! For every pair of row bounds whose height stays within `max_rows`, runs a
//! 1-D Kadane maximum-subarray over column prefix-sum differences and keeps
//! the best region seen. O(rows² · cols), with the row pairing clamped by
//! `max_rows`.
//!
//! Applied to a profit matrix this finds a rectangle of adjacent parameter
//! values with high aggregate profit — a neighborhood of good-but-stable
//! configurations rather than a single, possibly overfit, peak cell.

use serde::{Deserialize, Serialize};

/// Default row bound: wide enough to describe a neighborhood, tight enough
/// to stay a box rather than a column.
pub const DEFAULT_MAX_ROWS: usize = 10;

/// Highest-sum contiguous rectangle, inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub sum: f64,
    pub top: usize,
    pub left: usize,
    pub bottom: usize,
    pub right: usize,
}

impl Region {
    pub fn height(&self) -> usize {
        self.bottom - self.top + 1
    }

    pub fn width(&self) -> usize {
        self.right - self.left + 1
    }
}

/// Find the highest-sum contiguous submatrix with height <= `max_rows`.
///
/// Returns `None` only for an empty matrix; a single row or column still
/// yields valid bounds.
pub fn max_submatrix(matrix: &[Vec<f64>], max_rows: usize) -> Option<Region> {
    let rows = matrix.len();
    if rows == 0 || matrix[0].is_empty() || max_rows == 0 {
        return None;
    }
    let cols = matrix[0].len();

    // Vertical prefix sums: vps[i][j] = sum of column j over rows 0..=i.
    let mut vps = vec![vec![0.0; cols]; rows];
    for j in 0..cols {
        vps[0][j] = matrix[0][j];
        for i in 1..rows {
            vps[i][j] = vps[i - 1][j] + matrix[i][j];
        }
    }

    let mut best = Region {
        sum: matrix[0][0],
        top: 0,
        left: 0,
        bottom: 0,
        right: 0,
    };

    let mut sum = vec![0.0; cols];
    let mut pos = vec![0usize; cols];

    for i in 0..rows {
        for k in i..rows {
            if k - i + 1 > max_rows {
                break;
            }

            // Kadane over columns restricted to the i..=k row band. Only the
            // position of the running max is tracked; its value lives in sum.
            let band = |j: usize| {
                let above = if i > 0 { vps[i - 1][j] } else { 0.0 };
                vps[k][j] - above
            };

            sum[0] = band(0);
            pos[0] = 0;
            let mut local_max = 0;
            for j in 1..cols {
                let value = band(j);
                if sum[j - 1] > 0.0 {
                    sum[j] = sum[j - 1] + value;
                    pos[j] = pos[j - 1];
                } else {
                    sum[j] = value;
                    pos[j] = j;
                }
                if sum[j] > sum[local_max] {
                    local_max = j;
                }
            }

            if sum[local_max] > best.sum {
                best = Region {
                    sum: sum[local_max],
                    top: i,
                    left: pos[local_max],
                    bottom: k,
                    right: local_max,
                };
            }
        }
    }

    Some(best)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_matrix_returns_none() {
        assert_eq!(max_submatrix(&[], DEFAULT_MAX_ROWS), None);
        assert_eq!(max_submatrix(&[vec![]], DEFAULT_MAX_ROWS), None);
    }

    #[test]
    fn single_cell() {
        let region = max_submatrix(&[vec![-3.5]], DEFAULT_MAX_ROWS).unwrap();
        assert_eq!(region.sum, -3.5);
        assert_eq!((region.top, region.left, region.bottom, region.right), (0, 0, 0, 0));
    }

    #[test]
    fn single_positive_cell_among_negatives_is_exact() {
        let mut m = vec![vec![-1.0; 6]; 5];
        m[3][2] = 7.0;
        let region = max_submatrix(&m, DEFAULT_MAX_ROWS).unwrap();
        assert_eq!(region.sum, 7.0);
        assert_eq!((region.top, region.left, region.bottom, region.right), (3, 2, 3, 2));
        assert_eq!(region.height(), 1);
        assert_eq!(region.width(), 1);
    }

    #[test]
    fn single_row_matrix() {
        let m = vec![vec![-2.0, 4.0, 3.0, -8.0, 1.0]];
        let region = max_submatrix(&m, DEFAULT_MAX_ROWS).unwrap();
        assert_eq!(region.sum, 7.0);
        assert_eq!((region.left, region.right), (1, 2));
        assert_eq!((region.top, region.bottom), (0, 0));
    }

    #[test]
    fn single_column_matrix() {
        let m = vec![vec![1.0], vec![2.0], vec![-10.0], vec![5.0]];
        let region = max_submatrix(&m, DEFAULT_MAX_ROWS).unwrap();
        assert_eq!(region.sum, 5.0);
        assert_eq!((region.top, region.bottom), (3, 3));
    }

    #[test]
    fn finds_positive_block() {
        let m = vec![
            vec![-5.0, -5.0, -5.0, -5.0],
            vec![-5.0, 3.0, 4.0, -5.0],
            vec![-5.0, 2.0, 6.0, -5.0],
            vec![-5.0, -5.0, -5.0, -5.0],
        ];
        let region = max_submatrix(&m, DEFAULT_MAX_ROWS).unwrap();
        assert_eq!(region.sum, 15.0);
        assert_eq!((region.top, region.left, region.bottom, region.right), (1, 1, 2, 2));
    }

    #[test]
    fn row_bound_caps_region_height() {
        // A full column of ones: unbounded Kadane would take all 6 rows.
        let m = vec![vec![1.0]; 6];
        let region = max_submatrix(&m, 3).unwrap();
        assert_eq!(region.height(), 3);
        assert_eq!(region.sum, 3.0);
    }

    #[test]
    fn all_negative_picks_least_negative_cell() {
        let m = vec![vec![-4.0, -1.0], vec![-9.0, -2.0]];
        let region = max_submatrix(&m, DEFAULT_MAX_ROWS).unwrap();
        assert_eq!(region.sum, -1.0);
        assert_eq!((region.top, region.left, region.bottom, region.right), (0, 1, 0, 1));
    }
}
