//! Search driver behavior: recovery, reseeding, budget reporting

use crate::{DEFAULT_PROBES, Error, Integrate};
use std::collections::{HashMap, HashSet};

#[test]
fn test_integrate_finds_antiderivative_of_linear_target() {
    let result = Integrate::new()
        .depth(3)
        .candidates(1024)
        .max_seeds(50)
        .run("2*x")
        .expect("the search should recover an antiderivative of 2x");

    // whatever shape came back, its derivative must reproduce the target
    let vars: HashSet<String> = ["x".to_string()].into_iter().collect();
    let derivative = result.derivative(&vars).simplify();
    for z in DEFAULT_PROBES {
        let env: HashMap<String, f64> = [("x".to_string(), z)].into_iter().collect();
        let got = derivative.eval(&env);
        assert!(
            (got - 2.0 * z).abs() < 1e-12,
            "derivative of {} is {} at {}, expected {}",
            result,
            got,
            z,
            2.0 * z
        );
    }
}

#[test]
fn test_seed_budget_is_reported_after_stagnation() {
    // no depth-1 tree has a derivative matching x^3, so every seed must
    // stagnate and the budget surfaces as an error
    let result = Integrate::new()
        .depth(1)
        .candidates(64)
        .max_seeds(2)
        .run("x^3");

    assert_eq!(result, Err(Error::SeedLimitReached { seeds: 2 }));
}

#[test]
fn test_search_is_deterministic_for_fixed_settings() {
    let run = || {
        Integrate::new()
            .depth(2)
            .candidates(256)
            .max_seeds(10)
            .run("pi")
    };
    let (a, b) = (run(), run());
    match (a, b) {
        (Ok(x), Ok(y)) => assert_eq!(x.to_string(), y.to_string()),
        (Err(x), Err(y)) => assert_eq!(x, y),
        other => panic!("runs diverged: {:?}", other),
    }
}

#[test]
fn test_consensus_selector_also_recovers_targets() {
    let result = Integrate::new()
        .depth(3)
        .candidates(1024)
        .max_seeds(50)
        .selector(crate::Selector::Consensus)
        .run("2*x")
        .expect("consensus selection should also recover an antiderivative of 2x");

    let vars: HashSet<String> = ["x".to_string()].into_iter().collect();
    let derivative = result.derivative(&vars).simplify();
    let env: HashMap<String, f64> = [("x".to_string(), 3.0)].into_iter().collect();
    assert!((derivative.eval(&env) - 6.0).abs() < 1e-12);
}

#[test]
#[ignore = "long-running stochastic search"]
fn test_integrate_quartic_scenario() {
    // Integrate(5, "4*x^3") must return a tree equivalent to x^4 + C
    let result = crate::integrate(5, "4*x^3").expect("search runs until success");

    let vars: HashSet<String> = ["x".to_string()].into_iter().collect();
    let derivative = result.derivative(&vars).simplify();
    for z in DEFAULT_PROBES {
        let env: HashMap<String, f64> = [("x".to_string(), z)].into_iter().collect();
        let got = derivative.eval(&env);
        let expected = 4.0 * z * z * z;
        assert!(
            (got - expected).abs() < 1e-9 * expected.abs().max(1.0),
            "derivative of {} diverges at {}",
            result,
            z
        );
    }
}
