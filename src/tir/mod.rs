//! # TIR (Tensor Intermediate Representation) Module
//!
//! Value-semantic tensor IR infrastructure consumed by the bufferization
//! stage in [`crate::bufferize`].
//!
//! ## Module Organization
//!
//! - [`tir_nodes`]: Operation graph data structures (operations, values,
//!   types, attributes, regions)
//! - [`walk`]: Pre-order traversal with subtree pruning
//! - [`rewriter`]: Scoped mutation handle used by IR-rewriting passes
//! - [`display`]: Human-readable graph printing for debugging and tests
//!
//! The IR deliberately has no parser or binary serialization - graphs are
//! built programmatically by the frontend lowering (out of this crate's
//! scope) and by tests.

pub mod display;
pub mod rewriter;
pub mod tir_nodes;
pub mod walk;

// Re-export commonly used types for convenience
pub use rewriter::Rewriter;
pub use tir_nodes::{Attribute, OpId, OpKind, Operation, ScalarType, TirGraph, TirType, ValueId};
pub use walk::{WalkControl, preorder};
