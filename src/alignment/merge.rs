//! Merging two alignments along a DP traceback.

use std::cmp::Ordering;

use super::{Alignment, AlignmentError, Cell, Move, ScoreMatrix};

/// Merge `a` and `b` into one alignment following `moves`
///
/// The result has the rows of `a` followed by the rows of `b`, and one column
/// per move. Columns are then stably re-sorted by the mean retention time of
/// their peaks; columns without peaks sort last.
///
/// The moves must consume every column of both inputs exactly once.
pub fn merge_alignments(
    a: &Alignment,
    b: &Alignment,
    moves: &[Move],
) -> Result<Alignment, AlignmentError> {
    let (rows_a, rows_b) = (a.nrows(), b.nrows());
    let mut columns: Vec<Vec<Cell>> = Vec::with_capacity(moves.len());
    let (mut i, mut j) = (0usize, 0usize);

    for (pos, &step) in moves.iter().enumerate() {
        let take_a = matches!(step, Move::Match | Move::GapInSecond);
        let take_b = matches!(step, Move::Match | Move::GapInFirst);
        if (take_a && i >= a.ncols()) || (take_b && j >= b.ncols()) {
            return Err(AlignmentError::InvalidTraceback(format!(
                "move {} ({:?}) runs past the end of a {}x{} pairing",
                pos,
                step,
                a.ncols(),
                b.ncols()
            )));
        }

        let mut column = Vec::with_capacity(rows_a + rows_b);
        if take_a {
            column.extend(a.column(i).cloned());
            i += 1;
        } else {
            column.extend(std::iter::repeat(Cell::Gap).take(rows_a));
        }
        if take_b {
            column.extend(b.column(j).cloned());
            j += 1;
        } else {
            column.extend(std::iter::repeat(Cell::Gap).take(rows_b));
        }
        columns.push(column);
    }

    if i != a.ncols() || j != b.ncols() {
        return Err(AlignmentError::InvalidTraceback(format!(
            "moves consumed {}/{} and {}/{} columns",
            i,
            a.ncols(),
            j,
            b.ncols()
        )));
    }

    let mut keyed: Vec<(Option<f64>, Vec<Cell>)> = columns
        .into_iter()
        .map(|column| (mean_rt(&column), column))
        .collect();
    keyed.sort_by(|(x, _), (y, _)| compare_mean_rt(*x, *y));

    let expr_codes = a
        .expr_codes()
        .iter()
        .chain(b.expr_codes())
        .cloned()
        .collect();
    Alignment::from_columns(expr_codes, keyed.into_iter().map(|(_, c)| c).collect())
}

fn mean_rt(column: &[Cell]) -> Option<f64> {
    let (sum, count) = column
        .iter()
        .filter_map(Cell::peak)
        .fold((0.0, 0usize), |(s, n), p| (s + p.retention_time, n + 1));
    (count > 0).then(|| sum / count as f64)
}

fn compare_mean_rt(x: Option<f64>, y: Option<f64>) -> Ordering {
    match (x, y) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Similarity of a merged pair: `sum(1 - S[i, j])` over matches minus `gap_penalty` per gap
///
/// Higher means more similar.
pub fn alignment_similarity(
    moves: &[Move],
    scores: &ScoreMatrix,
    gap_penalty: f64,
) -> Result<f64, AlignmentError> {
    let mut matched = 0.0;
    let mut gaps = 0usize;
    walk_matches(moves, scores, |step| match step {
        Some(s) => matched += 1.0 - s,
        None => gaps += 1,
    })?;
    Ok(matched - gap_penalty * gaps as f64)
}

/// Legacy similarity: mean match cost scaled by `(cols(A) + cols(B)) / (2 * matches)`
///
/// Zero matches yields 0.0.
pub fn mean_match_cost(moves: &[Move], scores: &ScoreMatrix) -> Result<f64, AlignmentError> {
    let mut total = 0.0;
    let mut matches = 0usize;
    walk_matches(moves, scores, |step| {
        if let Some(s) = step {
            total += s;
            matches += 1;
        }
    })?;
    if matches == 0 {
        return Ok(0.0);
    }

    let (m, n) = scores.shape();
    let k = matches as f64;
    Ok(total / k * (m + n) as f64 / (2.0 * k))
}

/// Calls `visit` with the match cost for each match and `None` for each gap
fn walk_matches(
    moves: &[Move],
    scores: &ScoreMatrix,
    mut visit: impl FnMut(Option<f64>),
) -> Result<(), AlignmentError> {
    let (mut i, mut j) = (0usize, 0usize);
    for &step in moves {
        match step {
            Move::Match => {
                let score = scores.scores.get(i, j).copied().ok_or_else(|| {
                    AlignmentError::InvalidTraceback(format!(
                        "match at ({}, {}) outside a {:?} score matrix",
                        i,
                        j,
                        scores.shape()
                    ))
                })?;
                visit(Some(score));
                i += 1;
                j += 1;
            }
            Move::GapInSecond => {
                visit(None);
                i += 1;
            }
            Move::GapInFirst => {
                visit(None);
                j += 1;
            }
        }
    }
    Ok(())
}
