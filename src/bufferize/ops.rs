use crate::bufferize::analysis::AnalysisState;
use crate::bufferize_log;
use crate::compiler_errors::CompileError;
use crate::return_bufferize_error;
use crate::tir::rewriter::Rewriter;
use crate::tir::tir_nodes::{OpId, OpKind, Operation, ValueId};

/// The buffer capability interface.
///
/// An operation kind that implements this takes part in bufferization: the
/// escape annotator asks it which results are realized via fresh
/// allocations, and the conflict resolver hands it a rewriter (positioned
/// immediately before the operation) to fix up any of its own operands that
/// the analysis marked out of place.
///
/// Kinds outside this interface are invisible to the whole stage - the
/// traversal driver skips their subtrees entirely.
pub trait BufferizableOp {
    /// Is result `result_index` realized via a fresh memory allocation?
    fn bufferizes_to_allocation(&self, op: &Operation, result_index: usize) -> bool;

    /// Resolve read-after-write hazards on this operation's operands by
    /// inserting explicit duplicates through `rewriter`. This is the only
    /// mechanism in the system that introduces duplications.
    fn resolve_conflicts(
        &self,
        op: OpId,
        rewriter: &mut Rewriter,
        state: &AnalysisState,
    ) -> Result<(), CompileError>;
}

/// Capability dispatch, the moral equivalent of a dynamic interface cast:
/// `None` means the kind takes no part in bufferization.
pub fn bufferizable_op(kind: &OpKind) -> Option<&'static dyn BufferizableOp> {
    match kind {
        OpKind::Func { .. } => Some(&FuncCapability),
        OpKind::AllocTensor { .. } => Some(&AllocTensorCapability),
        OpKind::Fill => Some(&FillCapability),
        OpKind::Overwrite => Some(&OverwriteCapability),
        OpKind::Extract => Some(&ExtractCapability),

        OpKind::Constant | OpKind::Return | OpKind::Barrier => None,
    }
}

/// Default conflict resolution shared by every in-place-capable kind.
///
/// For each tensor operand the analysis marked out of place, insert a
/// copying `AllocTensor` immediately before the operation and rewire the
/// operand to the duplicate. The duplicate becomes an ordinary first-class
/// operation owned by the same graph; it is not revisited within the
/// current pass invocation (see the traversal driver).
pub(crate) fn resolve_operand_conflicts(
    op: OpId,
    rewriter: &mut Rewriter,
    state: &AnalysisState,
) -> Result<(), CompileError> {
    // Snapshot the operand edges up front: insertion mutates the graph
    let operands = rewriter.graph().op_or_error(op)?.operands.clone();

    for (operand_index, &value) in operands.iter().enumerate() {
        if !state.requires_copy(op, operand_index) {
            continue;
        }

        let value_type = rewriter.graph().value_type_or_error(value)?.clone();
        if !value_type.is_tensor() {
            // The analysis only hands out in-place decisions for tensor
            // operands. A copy request on a scalar means the analysis and
            // the graph disagree, and there is no way to honor it.
            return_bufferize_error!(
                format!(
                    "Cannot resolve conflict on operand {operand_index} of '{}': \
                     a non-tensor operand was marked as needing a copy",
                    rewriter.graph().op_or_error(op)?.kind.name()
                ),
                op,
                {
                    CompilationStage => "Bufferization",
                    ExpectedType => "tensor",
                    PrimarySuggestion => "The upstream analysis produced a decision for a value this operation cannot duplicate",
                }
            );
        }

        let duplicate = rewriter.insert_op(
            OpKind::AllocTensor { copy: true },
            vec![value],
            vec![value_type],
        )?;
        rewriter.set_operand(op, operand_index, ValueId::new(duplicate, 0))?;

        bufferize_log!(format!(
            "[Bufferize] Inserted duplicate %{} of {} for operand {} of op %{}",
            duplicate.0, value, operand_index, op.0
        ));
    }

    Ok(())
}

// ------------------------------------------------------------
// Per-kind capability implementations
// ------------------------------------------------------------

/// Functions hold bufferizable bodies but allocate nothing themselves.
struct FuncCapability;

impl BufferizableOp for FuncCapability {
    fn bufferizes_to_allocation(&self, _op: &Operation, _result_index: usize) -> bool {
        false
    }

    fn resolve_conflicts(
        &self,
        op: OpId,
        rewriter: &mut Rewriter,
        state: &AnalysisState,
    ) -> Result<(), CompileError> {
        resolve_operand_conflicts(op, rewriter, state)
    }
}

/// Every tensor result of an `AllocTensor` is a fresh allocation, including
/// the copying variant used for conflict duplicates.
struct AllocTensorCapability;

impl BufferizableOp for AllocTensorCapability {
    fn bufferizes_to_allocation(&self, op: &Operation, result_index: usize) -> bool {
        op.result_types
            .get(result_index)
            .is_some_and(|result_type| result_type.is_tensor())
    }

    fn resolve_conflicts(
        &self,
        op: OpId,
        rewriter: &mut Rewriter,
        state: &AnalysisState,
    ) -> Result<(), CompileError> {
        // The copy operand is read-only, so the default resolution
        // inserts nothing unless the analysis says otherwise
        resolve_operand_conflicts(op, rewriter, state)
    }
}

/// In-place element fill over its destination operand.
struct FillCapability;

impl BufferizableOp for FillCapability {
    fn bufferizes_to_allocation(&self, _op: &Operation, _result_index: usize) -> bool {
        // The result aliases the destination operand's buffer
        false
    }

    fn resolve_conflicts(
        &self,
        op: OpId,
        rewriter: &mut Rewriter,
        state: &AnalysisState,
    ) -> Result<(), CompileError> {
        resolve_operand_conflicts(op, rewriter, state)
    }
}

/// In-place overwrite of a sub-view of its destination operand.
struct OverwriteCapability;

impl BufferizableOp for OverwriteCapability {
    fn bufferizes_to_allocation(&self, _op: &Operation, _result_index: usize) -> bool {
        false
    }

    fn resolve_conflicts(
        &self,
        op: OpId,
        rewriter: &mut Rewriter,
        state: &AnalysisState,
    ) -> Result<(), CompileError> {
        resolve_operand_conflicts(op, rewriter, state)
    }
}

/// Pure tensor read. Participates in the interface so reads of conflicted
/// values still flow through the analysis, but it never mutates anything.
struct ExtractCapability;

impl BufferizableOp for ExtractCapability {
    fn bufferizes_to_allocation(&self, _op: &Operation, _result_index: usize) -> bool {
        false
    }

    fn resolve_conflicts(
        &self,
        op: OpId,
        rewriter: &mut Rewriter,
        state: &AnalysisState,
    ) -> Result<(), CompileError> {
        resolve_operand_conflicts(op, rewriter, state)
    }
}
