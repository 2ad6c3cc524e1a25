use crate::compiler_errors::CompileError;
use crate::settings::BufferizationOptions;
use crate::tir::tir_nodes::{OpId, TirGraph, ValueId};
use rustc_hash::FxHashSet;

/// Precomputed results of the whole-program alias/escape analysis.
///
/// The analysis itself runs upstream of this crate (see [`Analyzer`]); the
/// copy insertion pass only reads the answers. Two queries drive the pass:
///
/// - which values are observed (read or returned) outside the scope that
///   defines them, and
/// - which operand edges must be materialized out of place because another
///   live use still needs the pre-mutation contents.
#[derive(Debug)]
pub struct AnalysisState {
    options: BufferizationOptions,

    /// Values read or returned outside their defining scope.
    observed_outside_scope: FxHashSet<ValueId>,

    /// Operand edges (operation, operand index) with a read-after-write
    /// hazard: the operation wants to mutate the operand in place while the
    /// old contents are still live elsewhere.
    out_of_place_operands: FxHashSet<(OpId, usize)>,
}

impl AnalysisState {
    pub fn new(options: BufferizationOptions) -> Self {
        AnalysisState {
            options,
            observed_outside_scope: FxHashSet::default(),
            out_of_place_operands: FxHashSet::default(),
        }
    }

    pub fn options(&self) -> &BufferizationOptions {
        &self.options
    }

    pub fn is_value_observed_outside_scope(&self, value: ValueId) -> bool {
        self.observed_outside_scope.contains(&value)
    }

    /// Does this operand edge need an explicit duplicate before the
    /// operation may consume it in place?
    pub fn requires_copy(&self, op: OpId, operand_index: usize) -> bool {
        self.out_of_place_operands.contains(&(op, operand_index))
    }

    // Recording methods below are for the upstream analyzer (and tests)
    // to populate the state. The pass itself never calls them.

    pub fn mark_observed_outside_scope(&mut self, value: ValueId) {
        self.observed_outside_scope.insert(value);
    }

    pub fn mark_out_of_place(&mut self, op: OpId, operand_index: usize) {
        self.out_of_place_operands.insert((op, operand_index));
    }
}

/// The upstream analysis, supplied by the pass driver.
///
/// Implementations run either single-region or whole-program analysis
/// depending on `options.bufferize_function_boundaries`; that distinction
/// lives entirely inside the analyzer.
pub trait Analyzer {
    fn analyze(
        &self,
        graph: &TirGraph,
        root: OpId,
        options: &BufferizationOptions,
    ) -> Result<AnalysisState, CompileError>;
}
