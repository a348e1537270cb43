//! Property-based tests for the cost-expression algebra
//!
//! - Reduction is idempotent
//! - Nested products flatten on construction
//! - Sums reduce to their dominant term, across any number of terms

use codeprint::complexity::CostExpr;
use proptest::prelude::*;

fn variable() -> impl Strategy<Value = String> {
    prop_oneof![Just("n".to_string()), Just("m".to_string())]
}

fn leaf() -> impl Strategy<Value = CostExpr> {
    prop_oneof![
        (0u64..5).prop_map(|c| CostExpr::constant(c)),
        (2u32..4, variable()).prop_map(|(b, v)| CostExpr::logarithmic(b, v)),
        variable().prop_map(|v| CostExpr::linear(v)),
        (0u32..5, variable()).prop_map(|(d, v)| CostExpr::polynomial(d, v)),
        (2u32..4, variable()).prop_map(|(b, v)| CostExpr::exponential(b, v)),
        Just(CostExpr::symbolic("k", "unresolved bound")),
    ]
}

fn expr() -> impl Strategy<Value = CostExpr> {
    leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(|factors| CostExpr::multiply(factors)),
            prop::collection::vec(inner, 0..4).prop_map(|terms| CostExpr::add(terms)),
        ]
    })
}

fn rank(expr: &CostExpr) -> u32 {
    expr.reduce().dominance_rank()
}

proptest! {
    #[test]
    fn prop_reduce_is_idempotent(x in expr()) {
        let once = x.reduce();
        prop_assert_eq!(once.reduce(), once);
    }

    #[test]
    fn prop_big_o_is_stable_under_reduction(x in expr()) {
        prop_assert_eq!(x.reduce().to_big_o(), x.to_big_o());
    }

    #[test]
    fn prop_multiply_flattens(a in expr(), b in expr(), c in expr()) {
        let nested = CostExpr::multiply([CostExpr::multiply([a.clone(), b.clone()]), c.clone()]);
        let flat = CostExpr::multiply([a, b, c]);
        prop_assert_eq!(nested, flat);
    }

    #[test]
    fn prop_add_keeps_dominant_of_two(x in expr(), y in expr()) {
        prop_assume!(rank(&x) != rank(&y));
        let winner = if rank(&x) > rank(&y) { &x } else { &y };
        prop_assert_eq!(CostExpr::add([x.clone(), y.clone()]).reduce(), winner.reduce());
    }

    #[test]
    fn prop_add_dominance_is_transitive(x in expr(), y in expr(), z in expr()) {
        let ranks = [rank(&x), rank(&y), rank(&z)];
        let max = *ranks.iter().max().unwrap();
        prop_assume!(ranks.iter().filter(|r| **r == max).count() == 1);

        let winner = [&x, &y, &z]
            .into_iter()
            .find(|e| rank(e) == max)
            .unwrap()
            .reduce();
        prop_assert_eq!(CostExpr::add([x.clone(), y.clone(), z.clone()]).reduce(), winner.clone());
        // Grouping does not matter
        let grouped = CostExpr::add([CostExpr::add([x, y]), z]);
        prop_assert_eq!(grouped.reduce(), winner);
    }

    #[test]
    fn prop_compare_agrees_with_reduced_rank(x in expr(), y in expr()) {
        prop_assert_eq!(x.compare(&y), rank(&x).cmp(&rank(&y)));
    }
}
