use log::info;

use super::{align, Alignment, AlignmentError, PairwiseAlignment, ProgressEvent, RunContext};

fn take_slot(slots: &mut [Option<Alignment>], slot: usize) -> Result<Alignment, AlignmentError> {
    slots
        .get_mut(slot)
        .and_then(Option::take)
        .ok_or_else(|| AlignmentError::MalformedTree(format!("slot {} is empty", slot)))
}

/// Fold every input of `pairwise` into one alignment following its guide tree
///
/// Internal nodes are merged children-first, then columns with fewer than
/// `min_peaks` peaks are dropped from the root alignment. No inputs yields an
/// empty alignment. A single input is only filtered.
pub fn align_with_tree(
    pairwise: PairwiseAlignment,
    min_peaks: usize,
    ctx: &RunContext,
) -> Result<Alignment, AlignmentError> {
    if min_peaks == 0 {
        return Err(AlignmentError::InvalidParameter(
            "min_peaks must be at least 1".to_string(),
        ));
    }

    let PairwiseAlignment {
        alignments,
        params,
        tree,
        ..
    } = pairwise;
    let n = alignments.len();

    let mut result = match n {
        0 => return Ok(Alignment::empty()),
        1 => alignments.into_iter().next().unwrap_or_default(),
        _ => {
            let tree = tree.ok_or_else(|| {
                AlignmentError::MalformedTree(format!("no guide tree for {} inputs", n))
            })?;
            if tree.leaf_count() != n {
                return Err(AlignmentError::MalformedTree(format!(
                    "guide tree has {} leaves for {} inputs",
                    tree.leaf_count(),
                    n
                )));
            }

            let order = tree.topological_order()?;
            let root = tree.root()?;
            info!(
                "Aligning {} items with guide tree (D={:.2}, gap={:.2})",
                n, params.rt_tolerance, params.gap_penalty
            );
            ctx.emit(ProgressEvent::MergeStarted {
                merges: order.len(),
            });

            let mut slots: Vec<Option<Alignment>> = alignments
                .into_iter()
                .map(Some)
                .chain(std::iter::repeat_with(|| None).take(n - 1))
                .collect();

            for (done, &k) in order.iter().enumerate() {
                ctx.checkpoint()?;
                let node = tree.nodes()[k];
                let left = take_slot(&mut slots, node.left.slot(n))?;
                let right = take_slot(&mut slots, node.right.slot(n))?;
                let merged = align(&left, &right, &params)?;
                ctx.emit(ProgressEvent::Merged {
                    remaining: order.len() - done - 1,
                    columns: merged.ncols(),
                });
                slots[n + k] = Some(merged);
            }

            take_slot(&mut slots, root.slot(n))?
        }
    };

    let before = result.ncols();
    result.filter_min_peaks(min_peaks);
    ctx.emit(ProgressEvent::Filtered {
        before,
        after: result.ncols(),
    });
    Ok(result)
}
