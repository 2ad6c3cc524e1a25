use crate::settings::ESCAPE_ATTR_NAME;
use crate::tir::tir_nodes::{Attribute, OpId, ScalarType, TirGraph, TirType};

/// Render the subtree rooted at `root` as indented text.
///
/// Only used for debugging output and test failure messages, so the format
/// favors readability over stability.
pub fn graph_to_string(graph: &TirGraph, root: OpId) -> String {
    let mut out = String::new();
    write_op(graph, root, 0, &mut out);
    out
}

fn write_op(graph: &TirGraph, id: OpId, depth: usize, out: &mut String) {
    let Some(op) = graph.operation(id) else {
        out.push_str(&format!("{}<dangling op {}>\n", "  ".repeat(depth), id.0));
        return;
    };

    out.push_str(&"  ".repeat(depth));
    out.push_str(&format!("%{} = {}", op.id.0, op.kind.name()));

    if !op.operands.is_empty() {
        let operands = op
            .operands
            .iter()
            .map(|value| value.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!(" ({operands})"));
    }

    if !op.result_types.is_empty() {
        let results = op
            .result_types
            .iter()
            .map(type_to_string)
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!(" -> {results}"));
    }

    if let Some(Attribute::BoolArray(escapes)) = op.attribute(ESCAPE_ATTR_NAME) {
        out.push_str(&format!(" {{escape = {escapes:?}}}"));
    }

    out.push('\n');

    for region in &op.regions {
        for &child in region {
            write_op(graph, child, depth + 1, out);
        }
    }
}

fn type_to_string(value_type: &TirType) -> String {
    match value_type {
        TirType::Tensor { element, dims } => {
            let dims = dims
                .iter()
                .map(|dim| match dim {
                    Some(size) => size.to_string(),
                    None => "?".to_string(),
                })
                .collect::<Vec<_>>()
                .join("x");
            format!("tensor<{dims}x{}>", scalar_to_str(*element))
        }
        TirType::Scalar(scalar) => scalar_to_str(*scalar).to_string(),
        TirType::Unit => "unit".to_string(),
    }
}

fn scalar_to_str(scalar: ScalarType) -> &'static str {
    match scalar {
        ScalarType::I32 => "i32",
        ScalarType::I64 => "i64",
        ScalarType::F32 => "f32",
        ScalarType::F64 => "f64",
        ScalarType::Bool => "bool",
    }
}
