//! The convergence predicate (§4.3): a row-range reduction over the
//! per-cell delta between two buffers.

use crate::grid::Grid;

/// Returns `true` iff every interior-column cell in rows `[row_lo, row_hi)`
/// changed by no more than `epsilon` between `input` and `output`.
/// Short-circuits on the first cell that fails.
///
/// Column range is always the interior columns `[1, dim - 1)`; callers pass
/// the row range, since that's the axis both engines decompose along.
pub fn converged(input: &Grid, output: &Grid, row_lo: usize, row_hi: usize, epsilon: f64) -> bool {
    let dim = input.dim();
    for row in row_lo..row_hi {
        for col in 1..dim - 1 {
            if (output.get(row, col) - input.get(row, col)).abs() > epsilon {
                return false;
            }
        }
    }
    true
}

/// Same predicate over raw flat buffers, for callers (the distributed
/// engine's strip buffers) that don't hold a pair of [`Grid`]s.
pub fn converged_slice(
    input: &[f64],
    output: &[f64],
    dim: usize,
    row_lo: usize,
    row_hi: usize,
    col_lo: usize,
    col_hi: usize,
    epsilon: f64,
) -> bool {
    for row in row_lo..row_hi {
        for col in col_lo..col_hi {
            let idx = row * dim + col;
            if (output[idx] - input[idx]).abs() > epsilon {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_grids_converge() {
        let g = Grid::filled(5, 1.0).unwrap();
        assert!(converged(&g, &g, 1, 4, 0.0));
    }

    #[test]
    fn a_single_over_threshold_cell_fails_convergence() {
        let input = Grid::filled(5, 1.0).unwrap();
        let mut output = input.clone();
        output.set(2, 2, 1.0 + 0.2);
        assert!(!converged(&input, &output, 1, 4, 0.1));
        assert!(converged(&input, &output, 1, 4, 0.25));
    }

    #[test]
    fn row_range_restricts_the_scan() {
        let input = Grid::filled(6, 1.0).unwrap();
        let mut output = input.clone();
        output.set(4, 2, 50.0);
        // The differing cell sits in row 4; scanning only rows [1, 3) misses it.
        assert!(converged(&input, &output, 1, 3, 0.01));
        assert!(!converged(&input, &output, 1, 5, 0.01));
    }

    #[test]
    fn slice_variant_matches_grid_variant() {
        let input = Grid::filled(5, 2.0).unwrap();
        let mut output = input.clone();
        output.set(1, 1, 2.5);
        let dim = input.dim();
        assert_eq!(
            converged(&input, &output, 1, 4, 0.1),
            converged_slice(
                input.as_slice(),
                output.as_slice(),
                dim,
                1,
                4,
                1,
                dim - 1,
                0.1
            )
        );
    }
}
