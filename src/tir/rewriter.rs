use crate::compiler_errors::CompileError;
use crate::return_graph_error;
use crate::tir::tir_nodes::{Attribute, OpId, OpKind, TirGraph, TirType, ValueId};

/// Scoped handle for mutating the graph during a pass.
///
/// One rewriter is created per pass invocation and reused for every visited
/// operation; only its insertion point moves. All node insertion and
/// attribute writes performed by the bufferization stage go through here,
/// which keeps the mutation surface small enough to audit.
pub struct Rewriter<'g> {
    graph: &'g mut TirGraph,
    insertion_point: Option<OpId>,
}

impl<'g> Rewriter<'g> {
    pub fn new(graph: &'g mut TirGraph) -> Self {
        Rewriter {
            graph,
            insertion_point: None,
        }
    }

    pub fn graph(&self) -> &TirGraph {
        self.graph
    }

    /// Reposition the insertion point so new operations land immediately
    /// before `op` in its containing region.
    pub fn set_insertion_point_before(&mut self, op: OpId) -> Result<(), CompileError> {
        self.graph.op_or_error(op)?;
        self.insertion_point = Some(op);

        Ok(())
    }

    /// Create a new operation and place it at the current insertion point.
    pub fn insert_op(
        &mut self,
        kind: OpKind,
        operands: Vec<ValueId>,
        result_types: Vec<TirType>,
    ) -> Result<OpId, CompileError> {
        let Some(anchor) = self.insertion_point else {
            return_graph_error!("Rewriter has no insertion point set");
        };

        let op = self.graph.create_op(kind, operands, result_types);
        self.graph.insert_before(anchor, op)?;

        Ok(op)
    }

    pub fn set_operand(
        &mut self,
        op: OpId,
        operand_index: usize,
        value: ValueId,
    ) -> Result<(), CompileError> {
        self.graph.set_operand(op, operand_index, value)
    }

    pub fn set_attribute(
        &mut self,
        op: OpId,
        name: &'static str,
        attribute: Attribute,
    ) -> Result<(), CompileError> {
        self.graph.set_attribute(op, name, attribute)
    }
}
