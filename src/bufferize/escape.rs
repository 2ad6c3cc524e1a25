use crate::bufferize::analysis::AnalysisState;
use crate::bufferize::ops::BufferizableOp;
use crate::bufferize_log;
use crate::compiler_errors::CompileError;
use crate::settings::ESCAPE_ATTR_NAME;
use crate::tir::rewriter::Rewriter;
use crate::tir::tir_nodes::{Attribute, OpId};

/// Decide and attach the escape vector for one capability-bearing operation.
///
/// An operation that already carries the attribute (set by construction or
/// by an earlier run of the pass) is left untouched, so annotation is
/// idempotent by presence of the key.
///
/// The vector holds one flag per result in declaration order. Results that
/// are not tensors, or that the capability reports as non-allocating, are
/// always `false`. An allocating tensor result escapes when a later
/// deallocation pass is disabled (every allocation is then permanent) or
/// when the analysis observed the value outside its defining scope.
///
/// Operations with no allocating tensor result get no attribute at all:
/// consumers must treat "absent" as "not applicable", never as all-false.
pub(crate) fn annotate_escapes(
    rewriter: &mut Rewriter,
    op_id: OpId,
    capability: &dyn BufferizableOp,
    state: &AnalysisState,
) -> Result<(), CompileError> {
    let (found_allocating_result, escape_vector) = {
        let op = rewriter.graph().op_or_error(op_id)?;

        if op.has_attribute(ESCAPE_ATTR_NAME) {
            return Ok(());
        }

        let mut escape_vector = Vec::with_capacity(op.result_count());
        let mut found_allocating_result = false;

        for (result_index, result_type) in op.result_types.iter().enumerate() {
            if !result_type.is_tensor() || !capability.bufferizes_to_allocation(op, result_index) {
                escape_vector.push(false);
                continue;
            }

            found_allocating_result = true;
            let escape = !state.options().create_deallocs
                || state.is_value_observed_outside_scope(op.result(result_index));
            escape_vector.push(escape);
        }

        (found_allocating_result, escape_vector)
    };

    if found_allocating_result {
        bufferize_log!(format!(
            "[Bufferize] Escape vector for op %{}: {:?}",
            op_id.0, escape_vector
        ));
        rewriter.set_attribute(op_id, ESCAPE_ATTR_NAME, Attribute::BoolArray(escape_vector))?;
    }

    Ok(())
}
