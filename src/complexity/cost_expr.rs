//! Closed-form growth-rate terms and their Big-O reduction.
//!
//! `Multiply` and `Add` payloads are opaque so the only way to build them is
//! through [`CostExpr::multiply`] / [`CostExpr::add`], which flatten nested
//! products and sums on construction. [`CostExpr::reduce`] is idempotent.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Rank assigned to unresolved symbolic terms: above linear, below quadratic.
const SYMBOLIC_RANK: u32 = 15;
const EXPONENTIAL_RANK: u32 = 1000;
/// Highest rank any product of sub-exponential terms may reach.
const SUB_EXPONENTIAL_CEILING: u32 = EXPONENTIAL_RANK - 1;

/// Conventional name of the input-size variable.
pub const INPUT_VARIABLE: &str = "n";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CostExpr {
    Constant { value: u64 },
    Logarithmic { base: u32, variable: String },
    Linear { variable: String },
    Polynomial { degree: u32, variable: String },
    Exponential { base: u32, variable: String },
    Multiply { factors: Product },
    Add { terms: Sum },
    Symbolic { name: String, description: String },
}

/// Flattened factor list of a `Multiply`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<CostExpr>", into = "Vec<CostExpr>")]
pub struct Product(Vec<CostExpr>);

/// Flattened term list of an `Add`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<CostExpr>", into = "Vec<CostExpr>")]
pub struct Sum(Vec<CostExpr>);

impl Product {
    pub fn factors(&self) -> &[CostExpr] {
        &self.0
    }
}

impl Sum {
    pub fn terms(&self) -> &[CostExpr] {
        &self.0
    }
}

impl From<Vec<CostExpr>> for Product {
    fn from(factors: Vec<CostExpr>) -> Self {
        let mut flat = Vec::with_capacity(factors.len());
        for factor in factors {
            match factor {
                CostExpr::Multiply { factors } => flat.extend(factors.0),
                other => flat.push(other),
            }
        }
        Product(flat)
    }
}

impl From<Product> for Vec<CostExpr> {
    fn from(product: Product) -> Self {
        product.0
    }
}

impl From<Vec<CostExpr>> for Sum {
    fn from(terms: Vec<CostExpr>) -> Self {
        let mut flat = Vec::with_capacity(terms.len());
        for term in terms {
            match term {
                CostExpr::Add { terms } => flat.extend(terms.0),
                other => flat.push(other),
            }
        }
        Sum(flat)
    }
}

impl From<Sum> for Vec<CostExpr> {
    fn from(sum: Sum) -> Self {
        sum.0
    }
}

impl CostExpr {
    pub fn constant(value: u64) -> Self {
        CostExpr::Constant { value }
    }

    /// `O(1)`
    pub fn one() -> Self {
        Self::constant(1)
    }

    pub fn logarithmic(base: u32, variable: impl Into<String>) -> Self {
        CostExpr::Logarithmic {
            base,
            variable: variable.into(),
        }
    }

    /// `O(log n)` over [`INPUT_VARIABLE`].
    pub fn log_n() -> Self {
        Self::logarithmic(2, INPUT_VARIABLE)
    }

    /// `O(n)` over [`INPUT_VARIABLE`].
    pub fn n() -> Self {
        Self::linear(INPUT_VARIABLE)
    }

    pub fn linear(variable: impl Into<String>) -> Self {
        CostExpr::Linear {
            variable: variable.into(),
        }
    }

    pub fn polynomial(degree: u32, variable: impl Into<String>) -> Self {
        CostExpr::Polynomial {
            degree,
            variable: variable.into(),
        }
    }

    pub fn exponential(base: u32, variable: impl Into<String>) -> Self {
        CostExpr::Exponential {
            base,
            variable: variable.into(),
        }
    }

    pub fn symbolic(name: impl Into<String>, description: impl Into<String>) -> Self {
        CostExpr::Symbolic {
            name: name.into(),
            description: description.into(),
        }
    }

    /// Product of `factors`; nested products are merged into one factor list.
    pub fn multiply(factors: impl IntoIterator<Item = CostExpr>) -> Self {
        CostExpr::Multiply {
            factors: Product::from(factors.into_iter().collect::<Vec<_>>()),
        }
    }

    /// Sum of `terms`; nested sums are merged into one term list.
    pub fn add(terms: impl IntoIterator<Item = CostExpr>) -> Self {
        CostExpr::Add {
            terms: Sum::from(terms.into_iter().collect::<Vec<_>>()),
        }
    }

    /// Position in the dominance order used to pick the asymptotically
    /// larger term of a sum.
    pub fn dominance_rank(&self) -> u32 {
        match self {
            CostExpr::Constant { .. } => 0,
            CostExpr::Logarithmic { .. } => 1,
            CostExpr::Linear { .. } => 10,
            CostExpr::Polynomial { degree, .. } => {
                degree.saturating_mul(10).min(SUB_EXPONENTIAL_CEILING)
            }
            CostExpr::Exponential { base, .. } => EXPONENTIAL_RANK.saturating_add(*base),
            CostExpr::Symbolic { .. } => SYMBOLIC_RANK,
            CostExpr::Multiply { factors } => {
                let ranks = factors.factors().iter().map(CostExpr::dominance_rank);
                let sum = ranks.clone().fold(0u32, u32::saturating_add);
                if ranks.clone().any(|rank| rank >= EXPONENTIAL_RANK) {
                    sum
                } else {
                    sum.min(SUB_EXPONENTIAL_CEILING)
                }
            }
            CostExpr::Add { terms } => terms
                .terms()
                .iter()
                .map(CostExpr::dominance_rank)
                .max()
                .unwrap_or(0),
        }
    }

    /// Asymptotic comparison of two expressions.
    pub fn compare(&self, other: &CostExpr) -> Ordering {
        self.reduce()
            .dominance_rank()
            .cmp(&other.reduce().dominance_rank())
    }

    /// Simplify to canonical Big-O form.
    ///
    /// Products fold constants into one coefficient (dropped when 1) and sum
    /// the exponents of same-variable power factors. Sums keep only the
    /// terms of maximal dominance rank, one per distinct shape.
    pub fn reduce(&self) -> CostExpr {
        match self {
            CostExpr::Polynomial { degree: 0, .. } => CostExpr::one(),
            CostExpr::Polynomial {
                degree: 1,
                variable,
            } => CostExpr::linear(variable.clone()),
            CostExpr::Multiply { factors } => reduce_product(factors.factors()),
            CostExpr::Add { terms } => reduce_sum(terms.terms()),
            other => other.clone(),
        }
    }

    /// Big-O string; always reduces first.
    pub fn to_big_o(&self) -> String {
        format!("O({})", self.reduce().growth_term())
    }

    pub fn is_constant(&self) -> bool {
        matches!(self.reduce(), CostExpr::Constant { .. })
    }

    pub fn is_exponential(&self) -> bool {
        self.reduce().dominance_rank() >= EXPONENTIAL_RANK
    }

    fn coefficient(&self) -> u64 {
        match self {
            CostExpr::Constant { value } => *value,
            CostExpr::Multiply { factors } => factors
                .factors()
                .iter()
                .filter_map(|f| match f {
                    CostExpr::Constant { value } => Some(*value),
                    _ => None,
                })
                .fold(1u64, u64::saturating_mul),
            _ => 1,
        }
    }

    /// Growth term without constant coefficients, e.g. `n log n`.
    fn growth_term(&self) -> String {
        match self {
            CostExpr::Constant { .. } => "1".to_string(),
            CostExpr::Logarithmic { variable, .. } => format!("log {variable}"),
            CostExpr::Linear { variable } => variable.clone(),
            CostExpr::Polynomial { degree, variable } => format!("{variable}^{degree}"),
            CostExpr::Exponential { base, variable } => format!("{base}^{variable}"),
            CostExpr::Symbolic { name, .. } => name.clone(),
            CostExpr::Multiply { factors } => product_term(factors.factors()),
            CostExpr::Add { terms } => terms
                .terms()
                .iter()
                .map(CostExpr::growth_term)
                .collect::<Vec<_>>()
                .join(" + "),
        }
    }
}

impl fmt::Display for CostExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_big_o())
    }
}

fn reduce_product(factors: &[CostExpr]) -> CostExpr {
    let mut coefficient: u64 = 1;
    let mut powers: Vec<(String, u32)> = Vec::new();
    let mut others: Vec<CostExpr> = Vec::new();

    let reduced = factors.iter().map(CostExpr::reduce).flat_map(|f| match f {
        CostExpr::Multiply { factors } => factors.0,
        other => vec![other],
    });

    for factor in reduced {
        match factor {
            CostExpr::Constant { value } => coefficient = coefficient.saturating_mul(value),
            CostExpr::Linear { variable } => add_power(&mut powers, variable, 1),
            CostExpr::Polynomial { degree, variable } => add_power(&mut powers, variable, degree),
            other => others.push(other),
        }
    }

    let mut result = Vec::with_capacity(powers.len() + others.len() + 1);
    if coefficient != 1 {
        result.push(CostExpr::constant(coefficient));
    }
    result.extend(powers.into_iter().map(|(variable, degree)| {
        if degree == 1 {
            CostExpr::linear(variable)
        } else {
            CostExpr::polynomial(degree, variable)
        }
    }));
    result.extend(others);

    match result.len() {
        0 => CostExpr::one(),
        1 => result.remove(0),
        _ => CostExpr::Multiply {
            factors: Product(result),
        },
    }
}

fn add_power(powers: &mut Vec<(String, u32)>, variable: String, degree: u32) {
    match powers.iter_mut().find(|(v, _)| *v == variable) {
        Some((_, existing)) => *existing = existing.saturating_add(degree),
        None => powers.push((variable, degree)),
    }
}

fn reduce_sum(terms: &[CostExpr]) -> CostExpr {
    let flat: Vec<CostExpr> = terms
        .iter()
        .map(CostExpr::reduce)
        .flat_map(|t| match t {
            CostExpr::Add { terms } => terms.0,
            other => vec![other],
        })
        .collect();

    let Some(max_rank) = flat.iter().map(CostExpr::dominance_rank).max() else {
        return CostExpr::constant(0);
    };

    let mut kept: Vec<CostExpr> = Vec::new();
    for term in flat.into_iter().filter(|t| t.dominance_rank() == max_rank) {
        let shape = term.growth_term();
        match kept.iter_mut().find(|k| k.growth_term() == shape) {
            Some(existing) if term.coefficient() > existing.coefficient() => *existing = term,
            Some(_) => {}
            None => kept.push(term),
        }
    }

    if kept.len() == 1 {
        kept.remove(0)
    } else {
        CostExpr::Add { terms: Sum(kept) }
    }
}

fn product_term(factors: &[CostExpr]) -> String {
    let mut main = Vec::new();
    let mut logs = Vec::new();
    for factor in factors {
        match factor {
            CostExpr::Constant { .. } => {}
            CostExpr::Logarithmic { .. } => logs.push(factor.growth_term()),
            CostExpr::Add { .. } => main.push(format!("({})", factor.growth_term())),
            other => main.push(other.growth_term()),
        }
    }
    match (main.is_empty(), logs.is_empty()) {
        (true, true) => "1".to_string(),
        (true, false) => logs.join(" "),
        (false, true) => main.join("*"),
        (false, false) => format!("{} {}", main.join("*"), logs.join(" ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn n() -> CostExpr {
        CostExpr::linear("n")
    }

    #[test]
    fn test_exponential_outranks_any_polynomial() {
        let two_n = CostExpr::exponential(2, "n");
        for degree in [2, 99, 100, 101, 1_000, u32::MAX] {
            let poly = CostExpr::polynomial(degree, "n");
            assert_eq!(poly.compare(&two_n), Ordering::Less, "n^{degree}");
            assert_eq!(CostExpr::add([poly, two_n.clone()]).reduce(), two_n);
        }

        let product = CostExpr::multiply([
            CostExpr::polynomial(60, "n"),
            CostExpr::polynomial(60, "m"),
        ]);
        assert_eq!(product.compare(&two_n), Ordering::Less);
        let scaled = CostExpr::multiply([n(), two_n.clone()]);
        assert_eq!(scaled.compare(&two_n), Ordering::Greater);
    }

    #[test]
    fn test_multiply_flattens_on_construction() {
        let nested = CostExpr::multiply([
            CostExpr::multiply([n(), CostExpr::log_n()]),
            CostExpr::constant(3),
        ]);
        let flat = CostExpr::multiply([n(), CostExpr::log_n(), CostExpr::constant(3)]);
        assert_eq!(nested, flat);
    }

    #[test]
    fn test_add_flattens_on_construction() {
        let nested = CostExpr::add([CostExpr::add([n(), CostExpr::one()]), n()]);
        match nested {
            CostExpr::Add { terms } => assert_eq!(terms.terms().len(), 3),
            other => panic!("expected Add, got {other:?}"),
        }
    }

    #[test]
    fn test_reduce_combines_same_variable_powers() {
        let expr = CostExpr::multiply([n(), n(), CostExpr::polynomial(2, "n")]);
        assert_eq!(expr.reduce(), CostExpr::polynomial(4, "n"));
        assert_eq!(expr.to_big_o(), "O(n^4)");
    }

    #[test]
    fn test_reduce_folds_constants_and_drops_one() {
        let expr = CostExpr::multiply([CostExpr::constant(2), CostExpr::one(), CostExpr::constant(3), n()]);
        assert_eq!(
            expr.reduce(),
            CostExpr::multiply([CostExpr::constant(6), n()])
        );
        let unit = CostExpr::multiply([CostExpr::one(), n()]);
        assert_eq!(unit.reduce(), n());
    }

    #[test]
    fn test_sum_keeps_dominant_term() {
        let expr = CostExpr::add([
            CostExpr::one(),
            n(),
            CostExpr::polynomial(2, "n"),
            CostExpr::log_n(),
        ]);
        assert_eq!(expr.reduce(), CostExpr::polynomial(2, "n"));
    }

    #[test]
    fn test_exponential_dominates_polynomial() {
        let expr = CostExpr::add([CostExpr::polynomial(5, "n"), CostExpr::exponential(2, "n")]);
        assert_eq!(expr.to_big_o(), "O(2^n)");
    }

    #[test]
    fn test_symbolic_ranks_between_linear_and_quadratic() {
        let k = CostExpr::symbolic("k", "unresolved bound");
        assert_eq!(CostExpr::add([n(), k.clone()]).reduce(), k);
        assert_eq!(
            CostExpr::add([CostExpr::polynomial(2, "n"), k]).reduce(),
            CostExpr::polynomial(2, "n")
        );
    }

    #[test]
    fn test_equal_rank_different_shapes_are_kept() {
        let expr = CostExpr::add([n(), CostExpr::linear("m")]);
        assert_eq!(expr.to_big_o(), "O(n + m)");
    }

    #[test]
    fn test_same_shape_keeps_larger_coefficient() {
        let expr = CostExpr::add([n(), CostExpr::multiply([CostExpr::constant(3), n()])]);
        assert_eq!(
            expr.reduce(),
            CostExpr::multiply([CostExpr::constant(3), n()])
        );
        assert_eq!(expr.to_big_o(), "O(n)");
    }

    #[test]
    fn test_big_o_formatting() {
        assert_eq!(CostExpr::one().to_big_o(), "O(1)");
        assert_eq!(CostExpr::log_n().to_big_o(), "O(log n)");
        assert_eq!(
            CostExpr::multiply([n(), CostExpr::log_n()]).to_big_o(),
            "O(n log n)"
        );
        assert_eq!(CostExpr::polynomial(1, "n").to_big_o(), "O(n)");
        assert_eq!(CostExpr::polynomial(0, "n").to_big_o(), "O(1)");
    }

    #[test]
    fn test_reduce_is_idempotent_on_mixed_expression() {
        let expr = CostExpr::add([
            CostExpr::multiply([CostExpr::constant(4), n(), CostExpr::add([n(), CostExpr::linear("m")])]),
            CostExpr::polynomial(2, "n"),
            CostExpr::symbolic("k", ""),
        ]);
        let once = expr.reduce();
        assert_eq!(once.reduce(), once);
    }

    #[test]
    fn test_compare_uses_rank() {
        assert_eq!(n().compare(&CostExpr::log_n()), Ordering::Greater);
        assert_eq!(
            CostExpr::polynomial(1, "n").compare(&n()),
            Ordering::Equal
        );
    }

    #[test]
    fn test_serde_round_trip_keeps_flattening() {
        let expr = CostExpr::multiply([n(), CostExpr::constant(2)]);
        let json = serde_json::to_string(&expr).unwrap();
        let back: CostExpr = serde_json::from_str(&json).unwrap();
        assert_eq!(back, expr);
    }
}
