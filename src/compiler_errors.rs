use crate::tir::tir_nodes::OpId;
use std::collections::HashMap;

// The single error type emitted by the bufferization middle-end.
// The pass driver decides how failures are displayed to the user,
// so errors carry structured metadata rather than formatted text.
#[derive(Debug)]
pub struct CompileError {
    pub msg: String,

    // The operation the error was raised at, when one is known.
    // Graph-shape errors raised before an operation is resolved have no anchor.
    pub op: Option<OpId>,
    pub error_type: ErrorType,

    // This is for creating more structured and detailed error messages
    // without forcing every call site to build long format strings
    pub metadata: HashMap<ErrorMetaDataKey, &'static str>,
}

#[derive(Debug, Eq, Hash, PartialEq)]
pub enum ErrorMetaDataKey {
    CompilationStage,

    // Optional suggestions
    PrimarySuggestion,

    // Bufferization specifics
    ConflictingValue, // Value whose pre-mutation contents are still needed
    ExpectedType,
    FoundType,
}

#[derive(PartialEq, Debug)]
pub enum ErrorType {
    // Malformed operation graph (dangling ids, bad operand indices)
    Graph,

    // The upstream alias/escape analysis could not be computed
    Analysis,

    // A capability implementation could not resolve an in-place conflict
    Bufferize,

    // Options file / options table could not be parsed
    Config,
}

impl CompileError {
    pub fn new(msg: impl Into<String>, op: Option<OpId>, error_type: ErrorType) -> CompileError {
        CompileError {
            msg: msg.into(),
            op,
            error_type,
            metadata: HashMap::new(),
        }
    }

    pub fn with_op(mut self, op: OpId) -> Self {
        self.op = Some(op);
        self
    }

    pub fn new_metadata_entry(&mut self, key: ErrorMetaDataKey, value: &'static str) {
        self.metadata.insert(key, value);
    }

    /// Create a graph error for a structurally invalid operation graph
    pub fn graph_error(msg: impl Into<String>, op: Option<OpId>) -> Self {
        CompileError {
            msg: msg.into(),
            op,
            error_type: ErrorType::Graph,
            metadata: HashMap::new(),
        }
    }

    /// Create an analysis error (upstream analysis failed before the pass ran)
    pub fn analysis_error(msg: impl Into<String>) -> Self {
        CompileError {
            msg: msg.into(),
            op: None,
            error_type: ErrorType::Analysis,
            metadata: HashMap::new(),
        }
    }

    /// Create a config error for an options table that could not be parsed
    pub fn config_error(msg: impl Into<String>) -> Self {
        CompileError {
            msg: msg.into(),
            op: None,
            error_type: ErrorType::Config,
            metadata: HashMap::new(),
        }
    }
}

/// Returns a new CompileError for bufferization conflict-resolution failures.
///
/// These indicate that an operation's capability implementation could not
/// establish its in-place/duplication contract at the given operation.
///
/// Usage: `return_bufferize_error!("message", op_id)` or with metadata:
/// `return_bufferize_error!("message", op_id, { CompilationStage => "Bufferization" })`;
#[macro_export]
macro_rules! return_bufferize_error {
    // With metadata
    ($msg:expr, $op:expr, { $( $key:ident => $value:expr ),* $(,)? }) => {
        return Err($crate::compiler_errors::CompileError {
            msg: $msg.into(),
            op: Some($op),
            error_type: $crate::compiler_errors::ErrorType::Bufferize,
            metadata: {
                let mut map = std::collections::HashMap::new();
                $( map.insert($crate::compiler_errors::ErrorMetaDataKey::$key, $value); )*
                map
            },
        })
    };
    // Simple
    ($msg:expr, $op:expr) => {
        return Err($crate::compiler_errors::CompileError {
            msg: $msg.into(),
            op: Some($op),
            error_type: $crate::compiler_errors::ErrorType::Bufferize,
            metadata: std::collections::HashMap::new(),
        })
    };
}

/// Returns a new CompileError for malformed operation graphs.
///
/// Usage: `return_graph_error!("message")` or `return_graph_error!("message", op_id)`;
#[macro_export]
macro_rules! return_graph_error {
    ($msg:expr, $op:expr) => {
        return Err($crate::compiler_errors::CompileError {
            msg: $msg.into(),
            op: Some($op),
            error_type: $crate::compiler_errors::ErrorType::Graph,
            metadata: std::collections::HashMap::new(),
        })
    };
    ($msg:expr) => {
        return Err($crate::compiler_errors::CompileError {
            msg: $msg.into(),
            op: None,
            error_type: $crate::compiler_errors::ErrorType::Graph,
            metadata: std::collections::HashMap::new(),
        })
    };
}
