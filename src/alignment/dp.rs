//! Needleman-Wunsch global alignment over a cost matrix with a linear gap penalty.
//!
//! ```text
//! D[0,0] = 0; D[i,0] = g*i; D[0,j] = g*j
//! D[i,j] = min(D[i-1,j-1] + S[i-1,j-1], D[i-1,j] + g, D[i,j-1] + g)
//! ```
//!
//! Ties resolve to the first minimum in the order match, gap in second, gap in
//! first, so the traceback is reproducible.

use super::{AlignmentError, DenseMatrix};

/// One step of an alignment path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    /// Column `i` of the first input pairs with column `j` of the second (diagonal)
    Match,
    /// Column `i` of the first input pairs with a gap (up)
    GapInSecond,
    /// Column `j` of the second input pairs with a gap (left)
    GapInFirst,
}

impl Move {
    /// True for either gap move
    pub fn is_gap(self) -> bool {
        !matches!(self, Move::Match)
    }
}

/// Result of a dynamic programming alignment
#[derive(Debug, Clone)]
pub struct DpResult {
    /// Optimal cumulative cost `D[m, n]`
    pub cost: f64,
    /// Moves from `(0, 0)` to `(m, n)` in forward order
    pub moves: Vec<Move>,
    /// `(i, j)` column pairs joined by [`Move::Match`], in forward order
    pub matches: Vec<(usize, usize)>,
    /// The full `(m + 1) x (n + 1)` cumulative cost matrix
    pub cost_matrix: DenseMatrix<f64>,
}

impl DpResult {
    /// Number of gap moves
    pub fn gap_count(&self) -> usize {
        self.moves.iter().filter(|m| m.is_gap()).count()
    }

    /// Number of match moves
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }
}

/// Globally align the rows and columns of `scores` with linear gap penalty `gap_penalty`
pub fn dp(scores: &DenseMatrix<f64>, gap_penalty: f64) -> Result<DpResult, AlignmentError> {
    fill_and_trace(scores, gap_penalty, None)
}

/// Like [`dp`], but gap direction follows retention order
///
/// Whenever the cheapest move into cell `(i, j)` is a gap, the move instead
/// consumes whichever of the two current peaks elutes later, so unmatched
/// peaks come out in elution order: `rt_first[i-1] < rt_second[j-1]` gives
/// [`Move::GapInFirst`], greater gives [`Move::GapInSecond`], and equal times
/// keep the cheapest gap. The cell cost is recomputed for the chosen move.
pub fn dp_with_retention_order(
    scores: &DenseMatrix<f64>,
    gap_penalty: f64,
    rt_first: &[f64],
    rt_second: &[f64],
) -> Result<DpResult, AlignmentError> {
    if rt_first.len() != scores.nrows() || rt_second.len() != scores.ncols() {
        return Err(AlignmentError::DimensionMismatch(format!(
            "retention times ({}, {}) do not match score matrix {}x{}",
            rt_first.len(),
            rt_second.len(),
            scores.nrows(),
            scores.ncols()
        )));
    }
    fill_and_trace(scores, gap_penalty, Some((rt_first, rt_second)))
}

fn fill_and_trace(
    scores: &DenseMatrix<f64>,
    gap_penalty: f64,
    rt_order: Option<(&[f64], &[f64])>,
) -> Result<DpResult, AlignmentError> {
    if !(gap_penalty.is_finite() && gap_penalty >= 0.0) {
        return Err(AlignmentError::InvalidParameter(format!(
            "gap penalty must be finite and non-negative, got {}",
            gap_penalty
        )));
    }
    if let Some(bad) = scores.as_slice().iter().find(|v| !v.is_finite()) {
        return Err(AlignmentError::InvalidParameter(format!(
            "score matrix contains non-finite value {}",
            bad
        )));
    }

    let (m, n) = scores.shape();
    let mut cost = DenseMatrix::<f64>::new(m + 1, n + 1);
    let mut trace = DenseMatrix::<Option<Move>>::filled(m + 1, n + 1, None);

    for i in 1..=m {
        cost[(i, 0)] = gap_penalty * i as f64;
        trace[(i, 0)] = Some(Move::GapInSecond);
    }
    for j in 1..=n {
        cost[(0, j)] = gap_penalty * j as f64;
        trace[(0, j)] = Some(Move::GapInFirst);
    }

    for i in 1..=m {
        for j in 1..=n {
            let diag = cost[(i - 1, j - 1)] + scores[(i - 1, j - 1)];
            let up = cost[(i - 1, j)] + gap_penalty;
            let left = cost[(i, j - 1)] + gap_penalty;

            let (mut best, mut step) = (diag, Move::Match);
            if up < best {
                best = up;
                step = Move::GapInSecond;
            }
            if left < best {
                best = left;
                step = Move::GapInFirst;
            }

            if let Some((rt1, rt2)) = rt_order.filter(|_| step.is_gap()) {
                if rt1[i - 1] < rt2[j - 1] {
                    step = Move::GapInFirst;
                    best = left;
                } else if rt1[i - 1] > rt2[j - 1] {
                    step = Move::GapInSecond;
                    best = up;
                }
            }

            cost[(i, j)] = best;
            trace[(i, j)] = Some(step);
        }
    }

    let (moves, matches) = traceback(&trace, m, n)?;

    Ok(DpResult {
        cost: cost[(m, n)],
        moves,
        matches,
        cost_matrix: cost,
    })
}

fn traceback(
    trace: &DenseMatrix<Option<Move>>,
    m: usize,
    n: usize,
) -> Result<(Vec<Move>, Vec<(usize, usize)>), AlignmentError> {
    let mut moves = Vec::with_capacity(m + n);
    let mut matches = Vec::with_capacity(m.min(n));
    let (mut i, mut j) = (m, n);

    while i > 0 || j > 0 {
        let step = trace[(i, j)].ok_or_else(|| {
            AlignmentError::InvalidTraceback(format!("no move recorded at ({}, {})", i, j))
        })?;
        match step {
            Move::Match if i > 0 && j > 0 => {
                i -= 1;
                j -= 1;
                matches.push((i, j));
            }
            Move::GapInSecond if i > 0 => i -= 1,
            Move::GapInFirst if j > 0 => j -= 1,
            _ => {
                return Err(AlignmentError::InvalidTraceback(format!(
                    "move {:?} leaves the matrix at ({}, {})",
                    step, i, j
                )))
            }
        }
        moves.push(step);
    }

    moves.reverse();
    matches.reverse();
    Ok((moves, matches))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: Vec<Vec<f64>>) -> DenseMatrix<f64> {
        DenseMatrix::from_rows(rows).unwrap()
    }

    #[test]
    fn test_identity_matrix_all_matches() {
        let s = matrix(vec![
            vec![0.0, 1.0, 1.0],
            vec![1.0, 0.0, 1.0],
            vec![1.0, 1.0, 0.0],
        ]);
        let result = dp(&s, 0.5).unwrap();
        assert_eq!(result.moves, vec![Move::Match; 3]);
        assert_eq!(result.matches, vec![(0, 0), (1, 1), (2, 2)]);
        assert_eq!(result.cost, 0.0);
    }

    #[test]
    fn test_gap_inserted_for_missing_column() {
        // Second sequence lacks the middle element of the first
        let s = matrix(vec![vec![0.0, 1.0], vec![1.0, 1.0], vec![1.0, 0.0]]);
        let result = dp(&s, 0.5).unwrap();
        assert_eq!(result.moves, vec![Move::Match, Move::GapInSecond, Move::Match]);
        assert_eq!(result.matches, vec![(0, 0), (2, 1)]);
        assert_eq!(result.gap_count(), 1);
        assert!((result.cost - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_tie_prefers_match() {
        // Match cost 2g equals two gaps: the diagonal wins
        let s = matrix(vec![vec![1.0]]);
        let result = dp(&s, 0.5).unwrap();
        assert_eq!(result.moves, vec![Move::Match]);
    }

    #[test]
    fn test_empty_dimension() {
        let s = DenseMatrix::<f64>::new(2, 0);
        let result = dp(&s, 1.0).unwrap();
        assert_eq!(result.moves, vec![Move::GapInSecond, Move::GapInSecond]);
        assert_eq!(result.cost, 2.0);
    }

    #[test]
    fn test_cost_matrix_borders() {
        let s = DenseMatrix::<f64>::filled(2, 3, 0.3);
        let result = dp(&s, 0.2).unwrap();
        let d = &result.cost_matrix;
        assert_eq!(d.shape(), (3, 4));
        assert!((d[(2, 0)] - 0.4).abs() < 1e-12);
        assert!((d[(0, 3)] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_parameters() {
        let s = matrix(vec![vec![0.0]]);
        assert!(dp(&s, -1.0).is_err());
        assert!(dp(&s, f64::NAN).is_err());
        assert!(dp(&matrix(vec![vec![f64::NAN]]), 0.5).is_err());
    }

    #[test]
    fn test_gap_penalty_monotonic_matches() {
        let s = matrix(vec![
            vec![0.2, 0.9, 0.4, 1.0],
            vec![0.7, 0.1, 0.8, 0.6],
            vec![0.3, 0.95, 0.5, 0.2],
            vec![1.0, 0.4, 0.05, 0.9],
        ]);
        let counts: Vec<usize> = [0.0, 0.1, 1.0, 10.0]
            .iter()
            .map(|&g| dp(&s, g).unwrap().match_count())
            .collect();
        for pair in counts.windows(2) {
            assert!(pair[0] <= pair[1], "match counts {:?}", counts);
        }
        assert_eq!(counts[3], 4);
    }

    #[test]
    fn test_retention_order_variant() {
        let s = matrix(vec![vec![1.0, 1.0], vec![1.0, 1.0]]);
        let plain = dp(&s, 0.1).unwrap();
        let ordered = dp_with_retention_order(&s, 0.1, &[5.0, 20.0], &[10.0, 30.0]).unwrap();
        assert_eq!(plain.match_count(), 0);
        assert_eq!(ordered.moves.len(), 4);
        assert_eq!(ordered.match_count(), 0);
        // Peaks consumed in elution order: 5, 10, 20, 30
        assert_eq!(
            ordered.moves,
            vec![Move::GapInSecond, Move::GapInFirst, Move::GapInSecond, Move::GapInFirst]
        );
        assert!(dp_with_retention_order(&s, 0.1, &[1.0], &[1.0, 2.0]).is_err());
    }
}
