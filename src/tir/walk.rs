use crate::tir::tir_nodes::{OpId, Operation, TirGraph};

/// What a visitor wants done with the subtree rooted at the operation it was
/// just shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkControl {
    /// Descend into the operation's regions.
    Advance,

    /// Do not visit anything nested inside this operation.
    SkipSubtree,
}

/// Pre-order traversal over the operation graph rooted at `root`.
///
/// The visitor sees each operation before any of its regions' contents, so
/// it can prune entire subtrees. The traversal takes only shared references;
/// callers that need to mutate the graph while walking should collect a
/// snapshot of ids first and mutate afterwards.
pub fn preorder<F>(graph: &TirGraph, root: OpId, visit: &mut F)
where
    F: FnMut(&Operation) -> WalkControl,
{
    let Some(operation) = graph.operation(root) else {
        // Dangling ids are diagnosed by whoever mutates the graph,
        // not by a read-only walk
        return;
    };

    if visit(operation) == WalkControl::SkipSubtree {
        return;
    }

    for region in &operation.regions {
        for &child in region {
            preorder(graph, child, visit);
        }
    }
}
