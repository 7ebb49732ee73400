//! Guide tree for progressive alignment.
//!
//! Built by average-linkage (UPGMA) clustering of a distance matrix. The tree
//! over `n` leaves has `n - 1` internal nodes stored in a flat arena; node
//! references are explicit [`NodeRef`] values rather than signed indices.

use std::collections::BTreeSet;

use super::{AlignmentError, DenseMatrix};

/// Reference to a guide-tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRef {
    /// Input alignment `0..n`
    Leaf(usize),
    /// Internal (merge) node `0..n-1`
    Internal(usize),
}

impl NodeRef {
    /// Position in a slot array holding `leaves` inputs followed by internal nodes
    pub fn slot(self, leaves: usize) -> usize {
        match self {
            NodeRef::Leaf(i) => i,
            NodeRef::Internal(k) => leaves + k,
        }
    }

    /// Hierarchical-clustering numbering: leaves `0..n`, internal nodes `-1..-(n-1)`
    pub fn signed_id(self) -> i64 {
        match self {
            NodeRef::Leaf(i) => i as i64,
            NodeRef::Internal(k) => -(k as i64) - 1,
        }
    }

    /// Inverse of [`NodeRef::signed_id`]
    pub fn from_signed_id(id: i64) -> Self {
        if id >= 0 {
            NodeRef::Leaf(id as usize)
        } else {
            NodeRef::Internal((-id - 1) as usize)
        }
    }
}

/// Internal node joining two subtrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeNode {
    /// First child
    pub left: NodeRef,
    /// Second child
    pub right: NodeRef,
    /// Linkage distance at which the children were joined
    pub distance: f64,
}

/// Binary merge tree over `leaves` inputs
#[derive(Debug, Clone, PartialEq)]
pub struct GuideTree {
    leaves: usize,
    nodes: Vec<TreeNode>,
}

impl GuideTree {
    /// Build and validate a tree from explicit nodes
    pub fn from_nodes(leaves: usize, nodes: Vec<TreeNode>) -> Result<Self, AlignmentError> {
        let tree = Self { leaves, nodes };
        tree.validate()?;
        Ok(tree)
    }

    /// Average-linkage clustering of a square, symmetric distance matrix
    ///
    /// At each step the closest pair of active clusters is joined; ties go to
    /// the first pair in row-major order, and the cluster with the lower
    /// position becomes the left child. The distance from a joined cluster to
    /// any other is the size-weighted mean of its parts' distances.
    pub fn average_linkage(distances: &DenseMatrix<f64>) -> Result<Self, AlignmentError> {
        let n = distances.nrows();
        if n != distances.ncols() {
            return Err(AlignmentError::DimensionMismatch(format!(
                "distance matrix must be square, got {}x{}",
                n,
                distances.ncols()
            )));
        }
        if n == 0 {
            return Err(AlignmentError::EmptyInput(
                "cannot cluster an empty distance matrix".to_string(),
            ));
        }
        for i in 0..n {
            for j in (i + 1)..n {
                let d = distances[(i, j)];
                if !d.is_finite() {
                    return Err(AlignmentError::InvalidParameter(format!(
                        "distance ({}, {}) is not finite: {}",
                        i, j, d
                    )));
                }
            }
        }

        let mut work = distances.clone();
        let mut refs: Vec<NodeRef> = (0..n).map(NodeRef::Leaf).collect();
        let mut sizes = vec![1usize; n];
        let mut active: Vec<usize> = (0..n).collect();
        let mut nodes = Vec::with_capacity(n.saturating_sub(1));

        for k in 0..n.saturating_sub(1) {
            let (mut pa, mut pb) = (0, 1);
            let mut best = f64::INFINITY;
            for x in 0..active.len() {
                for y in (x + 1)..active.len() {
                    let d = work[(active[x], active[y])];
                    if d < best {
                        best = d;
                        pa = x;
                        pb = y;
                    }
                }
            }

            let (ia, ib) = (active[pa], active[pb]);
            nodes.push(TreeNode {
                left: refs[ia],
                right: refs[ib],
                distance: work[(ia, ib)],
            });

            let (sa, sb) = (sizes[ia] as f64, sizes[ib] as f64);
            for &c in &active {
                if c == ia || c == ib {
                    continue;
                }
                let d = (sa * work[(ia, c)] + sb * work[(ib, c)]) / (sa + sb);
                work[(ia, c)] = d;
                work[(c, ia)] = d;
            }

            refs[ia] = NodeRef::Internal(k);
            sizes[ia] += sizes[ib];
            active.remove(pb);
        }

        Ok(Self { leaves: n, nodes })
    }

    /// Number of leaves
    pub fn leaf_count(&self) -> usize {
        self.leaves
    }

    /// Internal nodes in creation order
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Internal node `k`
    pub fn node(&self, k: usize) -> Option<&TreeNode> {
        self.nodes.get(k)
    }

    /// Check node count, child references and reachability
    pub fn validate(&self) -> Result<(), AlignmentError> {
        self.root().map(|_| ())
    }

    /// The node that is nobody's child
    pub fn root(&self) -> Result<NodeRef, AlignmentError> {
        if self.leaves == 0 {
            return Err(AlignmentError::MalformedTree("tree has no leaves".to_string()));
        }
        if self.nodes.len() != self.leaves - 1 {
            return Err(AlignmentError::MalformedTree(format!(
                "{} leaves need {} internal nodes, found {}",
                self.leaves,
                self.leaves - 1,
                self.nodes.len()
            )));
        }
        if self.nodes.is_empty() {
            return Ok(NodeRef::Leaf(0));
        }

        let order = self.topological_order()?;
        order
            .last()
            .map(|&k| NodeRef::Internal(k))
            .ok_or_else(|| AlignmentError::MalformedTree("tree has no root".to_string()))
    }

    /// Internal node indices ordered so that children come before parents
    ///
    /// Among nodes whose children are resolved, the lowest index goes first,
    /// so a tree produced by [`GuideTree::average_linkage`] is returned in
    /// creation order. Fails on dangling or repeated child references, on
    /// cycles, and on forests with more than one root.
    pub fn topological_order(&self) -> Result<Vec<usize>, AlignmentError> {
        let m = self.nodes.len();
        let mut leaf_seen = vec![false; self.leaves];
        let mut parent: Vec<Option<usize>> = vec![None; m];
        let mut pending = vec![0usize; m];

        for (k, node) in self.nodes.iter().enumerate() {
            if node.left == node.right {
                return Err(AlignmentError::MalformedTree(format!(
                    "node {} joins {:?} with itself",
                    k, node.left
                )));
            }
            for child in [node.left, node.right] {
                match child {
                    NodeRef::Leaf(i) => {
                        let seen = leaf_seen.get_mut(i).ok_or_else(|| {
                            AlignmentError::MalformedTree(format!(
                                "node {} references missing leaf {}",
                                k, i
                            ))
                        })?;
                        if *seen {
                            return Err(AlignmentError::MalformedTree(format!(
                                "leaf {} has more than one parent",
                                i
                            )));
                        }
                        *seen = true;
                    }
                    NodeRef::Internal(c) => {
                        let slot = parent.get_mut(c).ok_or_else(|| {
                            AlignmentError::MalformedTree(format!(
                                "node {} references missing node {}",
                                k, c
                            ))
                        })?;
                        if slot.is_some() {
                            return Err(AlignmentError::MalformedTree(format!(
                                "node {} has more than one parent",
                                c
                            )));
                        }
                        *slot = Some(k);
                        pending[k] += 1;
                    }
                }
            }
        }

        if let Some(i) = leaf_seen.iter().position(|seen| !seen) {
            return Err(AlignmentError::MalformedTree(format!(
                "leaf {} is not attached to the tree",
                i
            )));
        }
        let roots = parent.iter().filter(|p| p.is_none()).count();
        if roots != 1 {
            return Err(AlignmentError::MalformedTree(format!(
                "expected one root, found {}",
                roots
            )));
        }

        let mut ready: BTreeSet<usize> = (0..m).filter(|&k| pending[k] == 0).collect();
        let mut order = Vec::with_capacity(m);
        while let Some(k) = ready.pop_first() {
            order.push(k);
            if let Some(p) = parent[k] {
                pending[p] -= 1;
                if pending[p] == 0 {
                    ready.insert(p);
                }
            }
        }

        if order.len() != m {
            return Err(AlignmentError::MalformedTree(format!(
                "cycle among {} internal nodes",
                m - order.len()
            )));
        }
        Ok(order)
    }
}
