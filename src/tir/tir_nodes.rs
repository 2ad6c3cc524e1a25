//! ============================================================
//!                         TIR Nodes
//! ============================================================
//! The value-semantic tensor IR that bufferization operates on.
//!  - Operations identified by stable IDs, owned by the graph
//!  - Values are (operation, result index) pairs
//!  - Nested regions hold ordered child operation lists
//!  - Open-ended string-keyed attributes per operation
//!
//! Tensor values have copy-on-write semantics in this IR. The bufferization
//! stage rewrites the graph so a later lowering can give every tensor a
//! concrete, possibly aliased, memory buffer.

use crate::compiler_errors::CompileError;
use crate::return_graph_error;
use rustc_hash::FxHashMap;

// ============================================================
// Stable IDs
// ============================================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpId(pub u32);

/// One typed result of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueId {
    pub op: OpId,
    pub index: u32,
}

impl ValueId {
    pub fn new(op: OpId, index: u32) -> Self {
        ValueId { op, index }
    }
}

impl std::fmt::Display for ValueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "%{}#{}", self.op.0, self.index)
    }
}

// ============================================================
// Types
// ============================================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    I32,
    I64,
    F32,
    F64,
    Bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TirType {
    /// Array-like value with copy-on-write semantics.
    /// `None` dimensions are dynamic.
    Tensor {
        element: ScalarType,
        dims: Vec<Option<u64>>,
    },

    Scalar(ScalarType),

    /// Produced by operations with no meaningful result value.
    Unit,
}

impl TirType {
    pub fn is_tensor(&self) -> bool {
        matches!(self, TirType::Tensor { .. })
    }
}

// ============================================================
// Attributes
// ============================================================
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Bool(bool),

    /// Ordered flags, one per operation result (the escape vector).
    BoolArray(Vec<bool>),

    Int(i64),
    Str(String),
}

// ============================================================
// Operation kinds
// ============================================================
#[derive(Debug, Clone, PartialEq)]
pub enum OpKind {
    /// Single-region function body holder.
    Func { name: String },

    /// Produces fresh tensor allocations. With `copy` set, operand 0 is a
    /// tensor whose contents initialize the allocation - this is the
    /// duplication operation conflict resolution inserts.
    AllocTensor { copy: bool },

    /// Writes a scalar across every element of its destination tensor
    /// (operand 0) in place, returning the updated tensor.
    Fill,

    /// Writes one tensor (operand 1) over a sub-view of another (operand 0)
    /// in place, returning the updated tensor.
    Overwrite,

    /// Pure read of a tensor element. Never mutates, never allocates.
    Extract,

    /// Scalar or tensor literal. Not part of the bufferization universe.
    Constant,

    /// Returns its operands out of the enclosing function.
    Return,

    /// Opaque single-region holder the bufferization stage never looks into.
    Barrier,
}

impl OpKind {
    pub fn name(&self) -> &'static str {
        match self {
            OpKind::Func { .. } => "func",
            OpKind::AllocTensor { copy: false } => "alloc_tensor",
            OpKind::AllocTensor { copy: true } => "alloc_tensor(copy)",
            OpKind::Fill => "fill",
            OpKind::Overwrite => "overwrite",
            OpKind::Extract => "extract",
            OpKind::Constant => "constant",
            OpKind::Return => "return",
            OpKind::Barrier => "barrier",
        }
    }
}

// ============================================================
// Operations
// ============================================================
#[derive(Debug, Clone)]
pub struct Operation {
    pub id: OpId,
    pub kind: OpKind,

    /// Operand edges into other operations' results.
    pub operands: Vec<ValueId>,

    /// Result types in declaration order.
    pub result_types: Vec<TirType>,

    /// Nested regions: ordered child operation lists.
    pub regions: Vec<Vec<OpId>>,

    /// Open-ended metadata. Bufferization reads and writes exactly one key,
    /// the escape vector under `ESCAPE_ATTR_NAME`.
    pub attributes: FxHashMap<&'static str, Attribute>,
}

impl Operation {
    pub fn result_count(&self) -> usize {
        self.result_types.len()
    }

    pub fn result(&self, index: usize) -> ValueId {
        ValueId::new(self.id, index as u32)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Source value for a copying `AllocTensor`, if this is one.
    pub fn copy_source(&self) -> Option<ValueId> {
        match self.kind {
            OpKind::AllocTensor { copy: true } => self.operands.first().copied(),
            _ => None,
        }
    }
}

// ============================================================
// Graph
// ============================================================

/// Owner of all operations. Operations never move once created; ordering
/// and nesting live in the region lists and the parent index.
#[derive(Debug, Default)]
pub struct TirGraph {
    operations: Vec<Operation>,

    /// Which operation's region each operation sits in. Roots are absent.
    parent_of: FxHashMap<OpId, OpId>,
}

impl TirGraph {
    pub fn new() -> Self {
        TirGraph {
            operations: Vec::new(),
            parent_of: FxHashMap::default(),
        }
    }

    /// Create a detached operation. It becomes reachable once placed into a
    /// region with `append_op` or `insert_before`.
    pub fn create_op(
        &mut self,
        kind: OpKind,
        operands: Vec<ValueId>,
        result_types: Vec<TirType>,
    ) -> OpId {
        let id = OpId(self.operations.len() as u32);

        self.operations.push(Operation {
            id,
            kind,
            operands,
            result_types,
            regions: Vec::new(),
            attributes: FxHashMap::default(),
        });

        id
    }

    /// Add an empty region to an operation, returning its index.
    pub fn add_region(&mut self, op: OpId) -> Result<usize, CompileError> {
        let operation = self.op_mut_or_error(op)?;
        operation.regions.push(Vec::new());

        Ok(operation.regions.len() - 1)
    }

    /// Place an operation at the end of a parent's region.
    pub fn append_op(
        &mut self,
        parent: OpId,
        region_index: usize,
        op: OpId,
    ) -> Result<(), CompileError> {
        // Validate the child exists before touching the parent
        self.op_or_error(op)?;

        let parent_op = self.op_mut_or_error(parent)?;
        let Some(region) = parent_op.regions.get_mut(region_index) else {
            return_graph_error!(
                format!(
                    "Operation '{}' has no region {region_index}",
                    parent_op.kind.name()
                ),
                parent
            );
        };

        region.push(op);
        self.parent_of.insert(op, parent);

        Ok(())
    }

    /// Place an operation immediately before another within the anchor's
    /// containing region.
    pub fn insert_before(&mut self, anchor: OpId, op: OpId) -> Result<(), CompileError> {
        self.op_or_error(op)?;

        let Some(parent) = self.parent_of.get(&anchor).copied() else {
            return_graph_error!(
                "Cannot insert before an operation that is not inside a region",
                anchor
            );
        };

        let mut slot = None;
        for (region_index, region) in self.op_or_error(parent)?.regions.iter().enumerate() {
            if let Some(position) = region.iter().position(|&id| id == anchor) {
                slot = Some((region_index, position));
                break;
            }
        }

        let Some((region_index, position)) = slot else {
            return_graph_error!(
                "Parent index is out of sync: anchor operation is missing from its parent's regions",
                anchor
            );
        };

        self.op_mut_or_error(parent)?.regions[region_index].insert(position, op);
        self.parent_of.insert(op, parent);

        Ok(())
    }

    pub fn operation(&self, id: OpId) -> Option<&Operation> {
        self.operations.get(id.0 as usize)
    }

    pub fn op_or_error(&self, id: OpId) -> Result<&Operation, CompileError> {
        let Some(operation) = self.operations.get(id.0 as usize) else {
            return_graph_error!(format!("Unknown operation id '{}'", id.0), id);
        };

        Ok(operation)
    }

    pub fn op_mut_or_error(&mut self, id: OpId) -> Result<&mut Operation, CompileError> {
        let Some(operation) = self.operations.get_mut(id.0 as usize) else {
            return_graph_error!(format!("Unknown operation id '{}'", id.0), id);
        };

        Ok(operation)
    }

    pub fn value_type(&self, value: ValueId) -> Option<&TirType> {
        self.operation(value.op)
            .and_then(|op| op.result_types.get(value.index as usize))
    }

    pub fn value_type_or_error(&self, value: ValueId) -> Result<&TirType, CompileError> {
        let operation = self.op_or_error(value.op)?;

        let Some(value_type) = operation.result_types.get(value.index as usize) else {
            return_graph_error!(
                format!(
                    "Operation '{}' has no result {} (result count {})",
                    operation.kind.name(),
                    value.index,
                    operation.result_count()
                ),
                value.op
            );
        };

        Ok(value_type)
    }

    /// Rewire one operand edge of an operation.
    pub fn set_operand(
        &mut self,
        op: OpId,
        operand_index: usize,
        value: ValueId,
    ) -> Result<(), CompileError> {
        // The new edge must point at a real result
        self.value_type_or_error(value)?;

        let operation = self.op_mut_or_error(op)?;
        let Some(operand) = operation.operands.get_mut(operand_index) else {
            return_graph_error!(
                format!(
                    "Operation '{}' has no operand {operand_index}",
                    operation.kind.name()
                ),
                op
            );
        };

        *operand = value;

        Ok(())
    }

    pub fn set_attribute(
        &mut self,
        op: OpId,
        name: &'static str,
        attribute: Attribute,
    ) -> Result<(), CompileError> {
        self.op_mut_or_error(op)?.attributes.insert(name, attribute);

        Ok(())
    }

    /// Total number of operations ever created, including detached ones.
    pub fn op_count(&self) -> usize {
        self.operations.len()
    }
}
