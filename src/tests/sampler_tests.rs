//! Sampler invariants: well-formedness, depth bounds, state threading

use crate::model::{MarkovModel, RIGHT_CHILD, State};
use crate::sampler::{Children, SampleNode};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn assert_well_formed(node: &SampleNode) {
    match &node.children {
        Children::Leaf => {
            assert!(
                node.op.is_terminal(),
                "{:?} cannot be a leaf",
                node.op
            );
        }
        Children::Unary(l) => {
            assert!(node.op.is_unary(), "{:?} cannot be unary", node.op);
            assert_well_formed(l);
        }
        Children::Binary(l, r) => {
            assert!(node.op.is_binary(), "{:?} cannot be binary", node.op);
            assert_well_formed(l);
            assert_well_formed(r);
        }
    }
}

fn assert_states_thread(node: &SampleNode) {
    match &node.children {
        Children::Leaf => {}
        Children::Unary(l) => {
            assert_eq!(l.state, node.state.left(node.op));
            assert_states_thread(l);
        }
        Children::Binary(l, r) => {
            assert_eq!(l.state, node.state.left(node.op));
            assert_eq!(r.state, node.state.right(node.op));
            assert!(r.state.0 & RIGHT_CHILD != 0, "right child carries the flag");
            assert_states_thread(l);
            assert_states_thread(r);
        }
    }
}

#[test]
fn test_sampled_trees_are_well_formed() {
    let model = MarkovModel::new();
    let mut rng = StdRng::seed_from_u64(1);
    for root in model.samples(5, 512, &mut rng) {
        assert_well_formed(&root);
    }
}

#[test]
fn test_sampled_trees_respect_depth_bound() {
    let model = MarkovModel::new();
    let mut rng = StdRng::seed_from_u64(2);
    for bound in 1..=6 {
        for root in model.samples(bound, 128, &mut rng) {
            assert!(
                root.depth() <= bound,
                "tree of depth {} exceeds bound {}",
                root.depth(),
                bound
            );
        }
    }
}

#[test]
fn test_depth_one_sampling_yields_terminals() {
    let model = MarkovModel::new();
    let mut rng = StdRng::seed_from_u64(3);
    for root in model.samples(1, 256, &mut rng) {
        assert!(matches!(root.children, Children::Leaf));
        assert!(root.op.is_terminal());
    }
}

#[test]
fn test_child_states_record_parent_operation() {
    let model = MarkovModel::new();
    let mut rng = StdRng::seed_from_u64(4);
    for root in model.samples(5, 256, &mut rng) {
        assert_eq!(root.state, State::ROOT);
        assert_states_thread(&root);
    }
}

#[test]
fn test_no_nested_power_towers() {
    fn assert_no_nesting(node: &SampleNode) {
        use crate::Op;
        if node.op == Op::Exponentiation {
            assert!(
                !node.state.names(Op::Exponentiation),
                "power sampled directly under a power"
            );
        }
        match &node.children {
            Children::Leaf => {}
            Children::Unary(l) => assert_no_nesting(l),
            Children::Binary(l, r) => {
                assert_no_nesting(l);
                assert_no_nesting(r);
            }
        }
    }

    let model = MarkovModel::new();
    let mut rng = StdRng::seed_from_u64(5);
    for root in model.samples(6, 512, &mut rng) {
        assert_no_nesting(&root);
    }
}

#[test]
fn test_sampled_trees_print_and_reparse() {
    // sampled trees stay inside the parser grammar except for the imaginary
    // constant, which the grammar has no literal for
    fn contains_imaginary(node: &SampleNode) -> bool {
        let here = node.op == crate::Op::Imaginary;
        match &node.children {
            Children::Leaf => here,
            Children::Unary(l) => here || contains_imaginary(l),
            Children::Binary(l, r) => here || contains_imaginary(l) || contains_imaginary(r),
        }
    }

    let model = MarkovModel::new();
    let mut rng = StdRng::seed_from_u64(6);
    for root in model.samples(4, 256, &mut rng) {
        if contains_imaginary(&root) {
            continue;
        }
        let printed = root.to_expr().to_string();
        let reparsed = crate::parse(&printed);
        assert!(
            reparsed.is_ok(),
            "sampled tree failed to reparse: {}",
            printed
        );
    }
}
