#![cfg(test)]

use crate::bufferize::analysis::{AnalysisState, Analyzer};
use crate::compiler_errors::CompileError;
use crate::settings::{BufferizationOptions, ESCAPE_ATTR_NAME};
use crate::tir::tir_nodes::{
    Attribute, OpId, OpKind, ScalarType, TirGraph, TirType, ValueId,
};

pub(crate) fn tensor_4xf32() -> TirType {
    TirType::Tensor {
        element: ScalarType::F32,
        dims: vec![Some(4)],
    }
}

pub(crate) fn scalar_f32() -> TirType {
    TirType::Scalar(ScalarType::F32)
}

/// A fresh graph holding one single-region function to build tests inside.
pub(crate) fn graph_with_func() -> (TirGraph, OpId) {
    let mut graph = TirGraph::new();
    let func = graph.create_op(
        OpKind::Func {
            name: "start".to_string(),
        },
        vec![],
        vec![],
    );
    graph.add_region(func).expect("func should take a region");

    (graph, func)
}

pub(crate) fn append_op(
    graph: &mut TirGraph,
    parent: OpId,
    kind: OpKind,
    operands: Vec<ValueId>,
    result_types: Vec<TirType>,
) -> OpId {
    let op = graph.create_op(kind, operands, result_types);
    graph
        .append_op(parent, 0, op)
        .expect("append into region 0 should succeed");
    op
}

/// `alloc_tensor` producing one 4xf32 tensor.
pub(crate) fn append_alloc(graph: &mut TirGraph, parent: OpId) -> OpId {
    append_op(
        graph,
        parent,
        OpKind::AllocTensor { copy: false },
        vec![],
        vec![tensor_4xf32()],
    )
}

pub(crate) fn append_constant(graph: &mut TirGraph, parent: OpId) -> OpId {
    append_op(graph, parent, OpKind::Constant, vec![], vec![scalar_f32()])
}

/// In-place `fill` of `dest` with `value`, returning the updated tensor.
pub(crate) fn append_fill(
    graph: &mut TirGraph,
    parent: OpId,
    dest: ValueId,
    value: ValueId,
) -> OpId {
    append_op(
        graph,
        parent,
        OpKind::Fill,
        vec![dest, value],
        vec![tensor_4xf32()],
    )
}

/// Pure read of one element of `source`.
pub(crate) fn append_extract(graph: &mut TirGraph, parent: OpId, source: ValueId) -> OpId {
    append_op(
        graph,
        parent,
        OpKind::Extract,
        vec![source],
        vec![scalar_f32()],
    )
}

pub(crate) fn append_return(graph: &mut TirGraph, parent: OpId, values: Vec<ValueId>) -> OpId {
    append_op(graph, parent, OpKind::Return, values, vec![])
}

pub(crate) fn default_state() -> AnalysisState {
    AnalysisState::new(BufferizationOptions::default())
}

/// Escape vector attached to an operation, if any.
pub(crate) fn escape_vector(graph: &TirGraph, op: OpId) -> Option<Vec<bool>> {
    match graph
        .op_or_error(op)
        .expect("operation should exist")
        .attribute(ESCAPE_ATTR_NAME)
    {
        Some(Attribute::BoolArray(flags)) => Some(flags.clone()),
        Some(other) => panic!("escape attribute has unexpected shape: {other:?}"),
        None => None,
    }
}

/// Ordered operation ids of the parent's first region.
pub(crate) fn region_ops(graph: &TirGraph, parent: OpId) -> Vec<OpId> {
    graph
        .op_or_error(parent)
        .expect("operation should exist")
        .regions[0]
        .clone()
}

/// Analyzer stub returning a canned analysis result, or a canned failure.
pub(crate) struct FixedAnalyzer {
    pub observed: Vec<ValueId>,
    pub out_of_place: Vec<(OpId, usize)>,
    pub fail: bool,
}

impl FixedAnalyzer {
    pub(crate) fn empty() -> Self {
        FixedAnalyzer {
            observed: Vec::new(),
            out_of_place: Vec::new(),
            fail: false,
        }
    }
}

impl Analyzer for FixedAnalyzer {
    fn analyze(
        &self,
        _graph: &TirGraph,
        _root: OpId,
        options: &BufferizationOptions,
    ) -> Result<AnalysisState, CompileError> {
        if self.fail {
            return Err(CompileError::analysis_error(
                "stub analysis failed on purpose",
            ));
        }

        let mut state = AnalysisState::new(options.clone());
        for value in &self.observed {
            state.mark_observed_outside_scope(*value);
        }
        for (op, operand_index) in &self.out_of_place {
            state.mark_out_of_place(*op, *operand_index);
        }

        Ok(state)
    }
}
