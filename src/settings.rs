use crate::compiler_errors::CompileError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Attribute key under which the escape vector is stored on an operation.
/// One bool per result: true means the result's backing allocation must not
/// be auto-freed before it leaves its defining scope.
pub const ESCAPE_ATTR_NAME: &str = "bufferize.escape";

// This is a guess at how many operations a typical function region holds.
// Only used to pre-size the traversal snapshot and avoid a few reallocations.
pub const LIKELY_OPS_PER_REGION: usize = 32;

/// Options for the tensor copy insertion pass.
///
/// Always passed explicitly into the pass entry points by the driving
/// component. There is no ambient or global configuration state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferizationOptions {
    /// Permit allocations to escape through function boundaries.
    /// Consumed by the upstream analysis, carried here so a single options
    /// value configures the whole bufferization stage.
    pub allow_return_allocs: bool,

    /// Selects whole-program analysis instead of single-region analysis
    /// in the upstream analyzer.
    pub bufferize_function_boundaries: bool,

    /// Whether a later pass will insert deallocations. When false, every
    /// allocation is effectively permanent and must be treated as escaping.
    pub create_deallocs: bool,

    /// Run the analysis and stop before any IR is mutated.
    pub test_analysis_only: bool,
}

impl Default for BufferizationOptions {
    fn default() -> Self {
        BufferizationOptions {
            allow_return_allocs: false,
            bufferize_function_boundaries: false,
            create_deallocs: true,
            test_analysis_only: false,
        }
    }
}

impl BufferizationOptions {
    /// Parse options from a TOML table, e.g. a `[bufferization]` section
    /// lifted out of a project's pass pipeline config.
    pub fn from_toml_str(source: &str) -> Result<Self, CompileError> {
        toml::from_str(source).map_err(|toml_error| {
            CompileError::config_error(format!(
                "Could not parse bufferization options: {toml_error}"
            ))
        })
    }

    /// Load options from a TOML file on disk.
    pub fn from_toml_file(path: &Path) -> Result<Self, CompileError> {
        let source = std::fs::read_to_string(path).map_err(|io_error| {
            CompileError::config_error(format!(
                "Could not read bufferization options file '{}': {io_error}",
                path.display()
            ))
        })?;

        Self::from_toml_str(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler_errors::ErrorType;
    use std::io::Write;

    #[test]
    fn defaults_match_driver_expectations() {
        let options = BufferizationOptions::default();

        assert!(!options.allow_return_allocs);
        assert!(!options.bufferize_function_boundaries);
        assert!(options.create_deallocs);
        assert!(!options.test_analysis_only);
    }

    #[test]
    fn partial_toml_table_fills_in_defaults() {
        let options = BufferizationOptions::from_toml_str("create_deallocs = false")
            .expect("options should parse");

        assert!(!options.create_deallocs);
        assert!(!options.allow_return_allocs);
        assert!(!options.test_analysis_only);
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let error = BufferizationOptions::from_toml_str("create_deallocs = \"yes\"")
            .expect_err("string is not a bool");

        assert_eq!(error.error_type, ErrorType::Config);
    }

    #[test]
    fn options_load_from_a_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file should be created");
        writeln!(file, "allow_return_allocs = true").expect("temp file should be writable");
        writeln!(file, "bufferize_function_boundaries = true")
            .expect("temp file should be writable");

        let options = BufferizationOptions::from_toml_file(file.path())
            .expect("options file should parse");

        assert!(options.allow_return_allocs);
        assert!(options.bufferize_function_boundaries);
        assert!(options.create_deallocs);
    }
}
