//! ============================================================
//!                          sorrel
//! ============================================================
//! Bufferization middle-end for a value-semantic tensor IR.
//!
//! The crate owns the tensor copy insertion stage: given an operation graph
//! with copy-on-write tensor semantics and an already-computed whole-program
//! alias/escape analysis, it
//!
//!  - marks which fresh allocations must escape their defining scope, and
//!  - inserts the explicit tensor duplicates that make in-place lowering
//!    of every remaining operation legal.
//!
//! It is a library with no CLI of its own; a pass driver supplies the graph,
//! the analysis and a [`settings::BufferizationOptions`] value and calls
//! [`bufferize::run_tensor_copy_insertion`] (or
//! [`bufferize::insert_tensor_copies`] when it already holds an
//! [`bufferize::AnalysisState`]).
//!
//! ## Pipeline position
//!
//! ```text
//! frontend lowering → alias/escape analysis → tensor copy insertion → buffer lowering
//!                     (external)              (this crate)            (external)
//! ```

pub mod bufferize;
pub mod settings;
pub mod tir;

pub mod compiler_errors;
pub(crate) mod compiler_dev_logging;

pub use bufferize::{AnalysisState, Analyzer, insert_tensor_copies, run_tensor_copy_insertion};
pub use compiler_errors::{CompileError, ErrorType};
pub use settings::{BufferizationOptions, ESCAPE_ATTR_NAME};
