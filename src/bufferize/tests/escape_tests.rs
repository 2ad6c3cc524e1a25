#![cfg(test)]

use crate::bufferize::analysis::AnalysisState;
use crate::bufferize::insert_tensor_copies;
use crate::bufferize::tests::test_support::{
    append_alloc, append_fill, append_constant, append_return, default_state, escape_vector,
    graph_with_func, scalar_f32, tensor_4xf32,
};
use crate::settings::{BufferizationOptions, ESCAPE_ATTR_NAME};
use crate::tir::tir_nodes::{Attribute, OpKind, ValueId};

#[test]
fn returned_allocation_escapes() {
    let (mut graph, func) = graph_with_func();
    let alloc = append_alloc(&mut graph, func);
    append_return(&mut graph, func, vec![ValueId::new(alloc, 0)]);

    let mut state = default_state();
    state.mark_observed_outside_scope(ValueId::new(alloc, 0));

    insert_tensor_copies(&mut graph, func, &state).expect("pass should succeed");

    assert_eq!(escape_vector(&graph, alloc), Some(vec![true]));
}

#[test]
fn local_allocation_does_not_escape() {
    let (mut graph, func) = graph_with_func();
    let alloc = append_alloc(&mut graph, func);

    let state = default_state();
    insert_tensor_copies(&mut graph, func, &state).expect("pass should succeed");

    assert_eq!(escape_vector(&graph, alloc), Some(vec![false]));
}

#[test]
fn disabled_deallocation_forces_escape_everywhere() {
    let (mut graph, func) = graph_with_func();
    let alloc = append_alloc(&mut graph, func);

    // Nothing observed outside scope, yet the flag must still be true
    let state = AnalysisState::new(BufferizationOptions {
        create_deallocs: false,
        ..BufferizationOptions::default()
    });

    insert_tensor_copies(&mut graph, func, &state).expect("pass should succeed");

    assert_eq!(escape_vector(&graph, alloc), Some(vec![true]));
}

#[test]
fn non_allocating_op_gets_no_escape_vector() {
    let (mut graph, func) = graph_with_func();
    let alloc = append_alloc(&mut graph, func);
    let value = append_constant(&mut graph, func);
    let fill = append_fill(
        &mut graph,
        func,
        ValueId::new(alloc, 0),
        ValueId::new(value, 0),
    );

    let state = default_state();
    insert_tensor_copies(&mut graph, func, &state).expect("pass should succeed");

    // Fill's result aliases its destination buffer: absent, not all-false
    assert_eq!(escape_vector(&graph, fill), None);
}

#[test]
fn vector_length_matches_result_count_with_mixed_results() {
    let (mut graph, func) = graph_with_func();

    // Allocation with a scalar bookkeeping result alongside two tensors
    let alloc = graph.create_op(
        OpKind::AllocTensor { copy: false },
        vec![],
        vec![tensor_4xf32(), scalar_f32(), tensor_4xf32()],
    );
    graph.append_op(func, 0, alloc).expect("append");
    append_return(&mut graph, func, vec![ValueId::new(alloc, 2)]);

    let mut state = default_state();
    state.mark_observed_outside_scope(ValueId::new(alloc, 2));

    insert_tensor_copies(&mut graph, func, &state).expect("pass should succeed");

    // One entry per result; the scalar entry is always false
    assert_eq!(escape_vector(&graph, alloc), Some(vec![false, false, true]));
}

#[test]
fn existing_escape_vector_is_never_recomputed() {
    let (mut graph, func) = graph_with_func();
    let alloc = append_alloc(&mut graph, func);
    append_return(&mut graph, func, vec![ValueId::new(alloc, 0)]);

    // Pre-set by construction; a fresh run would have computed [true]
    graph
        .set_attribute(alloc, ESCAPE_ATTR_NAME, Attribute::BoolArray(vec![false]))
        .expect("attribute write should succeed");

    let mut state = default_state();
    state.mark_observed_outside_scope(ValueId::new(alloc, 0));

    insert_tensor_copies(&mut graph, func, &state).expect("pass should succeed");

    assert_eq!(escape_vector(&graph, alloc), Some(vec![false]));
}

#[test]
fn rerunning_the_pass_changes_nothing() {
    let (mut graph, func) = graph_with_func();
    let alloc = append_alloc(&mut graph, func);
    append_return(&mut graph, func, vec![ValueId::new(alloc, 0)]);

    let mut state = default_state();
    state.mark_observed_outside_scope(ValueId::new(alloc, 0));

    insert_tensor_copies(&mut graph, func, &state).expect("first run should succeed");
    let after_first = escape_vector(&graph, alloc);
    let ops_after_first = graph.op_count();

    insert_tensor_copies(&mut graph, func, &state).expect("second run should succeed");

    assert_eq!(escape_vector(&graph, alloc), after_first);
    assert_eq!(graph.op_count(), ops_after_first);
}
