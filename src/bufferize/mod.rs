//! # Bufferization Module
//!
//! Prepares the value-semantic tensor IR for lowering into a
//! memory-semantic form. This stage sits between the upstream
//! alias/escape analysis (consumed read-only via [`AnalysisState`])
//! and the later buffer lowering, and has exactly two jobs:
//!
//! 1. **Escape annotation** - record, per allocating tensor result, whether
//!    the allocation must outlive its defining scope ([`escape`]).
//! 2. **Conflict resolution** - let every capability-bearing operation
//!    insert explicit duplicates for operands it would otherwise corrupt by
//!    mutating in place ([`ops`]).
//!
//! Both run inside one pre-order traversal, annotation strictly before
//! resolution at each operation, with the first resolution failure aborting
//! the rest of the traversal. The output graph is semantically equivalent
//! to the input under the copy-on-write model.

pub mod analysis;
mod escape;
pub mod ops;

#[cfg(test)]
mod tests;

pub use analysis::{AnalysisState, Analyzer};
pub use ops::{BufferizableOp, bufferizable_op};

use crate::compiler_errors::CompileError;
use crate::settings::{BufferizationOptions, LIKELY_OPS_PER_REGION};
use crate::tir::rewriter::Rewriter;
use crate::tir::tir_nodes::{OpId, TirGraph};
use crate::tir::walk::{WalkControl, preorder};
use crate::{bufferize_log, timer_log};

/// Run the upstream analysis, then insert tensor copies.
///
/// This is the driver-facing entry point: it owns the analyze-then-mutate
/// ordering. With `options.test_analysis_only` set, the analysis runs and
/// the graph is returned untouched.
pub fn run_tensor_copy_insertion(
    graph: &mut TirGraph,
    root: OpId,
    options: &BufferizationOptions,
    analyzer: &dyn Analyzer,
) -> Result<(), CompileError> {
    let _pass_timer = std::time::Instant::now();

    // Whole-program vs. single-region analysis is the analyzer's concern;
    // it reads options.bufferize_function_boundaries itself.
    let state = analyzer.analyze(graph, root, options)?;

    if options.test_analysis_only {
        return Ok(());
    }

    insert_tensor_copies(graph, root, &state)?;

    timer_log!(_pass_timer, "Tensor copy insertion: ");

    Ok(())
}

/// Insert tensor copies using an already-computed analysis state.
///
/// Traversal order is made explicit: a pre-order snapshot of the
/// capability-bearing operations is taken before any mutation, and only
/// those operations are visited. Duplicates inserted during conflict
/// resolution therefore take no part in the current invocation - a
/// deliberate policy, since they are inserted *before* an already-reached
/// operation. A later invocation of this same pass annotates them (they
/// carry no escape attribute yet and allocate), which tests pin down.
///
/// On the first conflict-resolution failure the remaining operations are
/// not visited and the graph is left partially mutated; the transformation
/// is deterministic, so a given input either always succeeds or always
/// fails the same way.
pub fn insert_tensor_copies(
    graph: &mut TirGraph,
    root: OpId,
    state: &AnalysisState,
) -> Result<(), CompileError> {
    let snapshot = collect_bufferizable_ops(graph, root);

    bufferize_log!(format!(
        "[Bufferize] Visiting {} bufferizable ops under root %{}",
        snapshot.len(),
        root.0
    ));

    let mut rewriter = Rewriter::new(graph);

    for op_id in snapshot {
        let op = rewriter.graph().op_or_error(op_id)?;
        let Some(capability) = bufferizable_op(&op.kind) else {
            // Kinds are fixed per operation, so everything snapshotted
            // still dispatches; guard anyway rather than unwrap
            continue;
        };

        // Metadata before mutation: the escape vector describes the
        // operation as the analysis saw it, not the rewritten form
        escape::annotate_escapes(&mut rewriter, op_id, capability, state)?;

        rewriter.set_insertion_point_before(op_id)?;
        capability.resolve_conflicts(op_id, &mut rewriter, state)?;
    }

    Ok(())
}

/// Pre-order snapshot of every capability-bearing operation under `root`.
///
/// A non-capability operation prunes its whole subtree: well-formed input
/// never nests bufferizable operations inside non-bufferizable ones, and
/// the stage leans on that to skip opaque regions wholesale.
fn collect_bufferizable_ops(graph: &TirGraph, root: OpId) -> Vec<OpId> {
    let mut snapshot = Vec::with_capacity(LIKELY_OPS_PER_REGION);

    preorder(graph, root, &mut |op| {
        if bufferizable_op(&op.kind).is_none() {
            return WalkControl::SkipSubtree;
        }

        snapshot.push(op.id);
        WalkControl::Advance
    });

    snapshot
}
