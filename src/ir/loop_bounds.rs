//! Textual classification of loop iteration counts.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::complexity::cost_expr::CostExpr;

static HALVING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(\*=\s*2\b|/=\s*2\b|//=\s*2\b|>>=\s*1\b|<<=\s*1\b|[\w)\]]\s*(\*|/|//)\s*2\b|[\w)\]]\s*>>\s*1\b)",
    )
    .unwrap()
});

static SIZE_ACCESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Za-z_][\w.]*?)\s*(\.length\b|\.size\(\)|\.size\b|\.count\(\)|\.Count\b|\.Length\b|\.len\(\))").unwrap()
});

static LEN_CALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(len|count|size|sizeof)\(\s*([A-Za-z_][\w.]*)").unwrap());

static NUMERIC_UPPER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(<=?\s*(\d+)\b|\brange\(\s*(?:\d+\s*,\s*)?(\d+)\s*[,)]|\b(\d+)\s*>=?|\.\.=?\s*(\d+)\b)")
        .unwrap()
});

static IDENT_UPPER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(<=?\s*([A-Za-z_]\w*)\b|\brange\(\s*(?:\w+\s*,\s*)?([A-Za-z_]\w*)\s*[,)]|\b([A-Za-z_]\w*)\s*>=?|\.\.=?\s*([A-Za-z_]\w*)\b)")
        .unwrap()
});

/// How a loop's iteration count was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundKind {
    /// Fixed numeric bound
    Constant,
    /// Bound tied to a named input, e.g. a collection length
    Input,
    /// Bound present but not classifiable
    Symbolic,
    Unknown,
}

/// Growth class used when folding loops by nesting level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoopGrowth {
    Constant,
    Logarithmic,
    Linear,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopBounds {
    pub kind: BoundKind,
    pub cost: CostExpr,
    /// Variable or collection driving the bound, when one was found
    pub variable: Option<String>,
}

impl LoopBounds {
    pub fn constant(iterations: u64) -> Self {
        Self {
            kind: BoundKind::Constant,
            cost: CostExpr::constant(iterations),
            variable: None,
        }
    }

    pub fn input(variable: impl Into<String>) -> Self {
        Self {
            kind: BoundKind::Input,
            cost: CostExpr::n(),
            variable: Some(variable.into()),
        }
    }

    pub fn logarithmic(variable: Option<String>) -> Self {
        Self {
            kind: BoundKind::Input,
            cost: CostExpr::log_n(),
            variable,
        }
    }

    pub fn symbolic(variable: impl Into<String>) -> Self {
        Self {
            kind: BoundKind::Symbolic,
            cost: CostExpr::n(),
            variable: Some(variable.into()),
        }
    }

    pub fn unknown() -> Self {
        Self {
            kind: BoundKind::Unknown,
            cost: CostExpr::symbolic("k", "unclassified loop bound"),
            variable: None,
        }
    }

    /// Unknown and symbolic bounds count as linear.
    pub fn growth(&self) -> LoopGrowth {
        match (&self.kind, &self.cost) {
            (BoundKind::Constant, _) => LoopGrowth::Constant,
            (_, CostExpr::Logarithmic { .. }) => LoopGrowth::Logarithmic,
            _ => LoopGrowth::Linear,
        }
    }

    pub fn is_input_bound(&self) -> bool {
        matches!(self.kind, BoundKind::Input | BoundKind::Symbolic)
    }
}

/// Classify a loop from its header text (condition, plus initializer and
/// update for C-style loops).
///
/// Checks run in order: halving/doubling step ⇒ `O(log n)`, size or length
/// access ⇒ input bound `O(n)`, numeric upper bound ⇒ constant, bare
/// identifier bound ⇒ symbolic; anything else is unknown.
pub fn classify_loop_header(header: &str) -> LoopBounds {
    if HALVING.is_match(header) {
        let variable = size_variable(header).or_else(|| identifier_bound(header));
        return LoopBounds::logarithmic(variable);
    }
    if let Some(variable) = size_variable(header) {
        return LoopBounds::input(variable);
    }
    if let Some(iterations) = numeric_bound(header) {
        return LoopBounds::constant(iterations);
    }
    if let Some(variable) = identifier_bound(header) {
        return LoopBounds::symbolic(variable);
    }
    LoopBounds::unknown()
}

/// Bounds for `for x in items` / `for (const x of items)` style iteration.
pub fn collection_iteration(iterable: &str) -> LoopBounds {
    let iterable = iterable.trim();
    if let Some(iterations) = numeric_bound(iterable) {
        return LoopBounds::constant(iterations);
    }
    if let Some(variable) = size_variable(iterable) {
        return LoopBounds::input(variable);
    }
    let is_range = iterable.starts_with("range") || iterable.contains("..");
    if let Some(variable) = identifier_bound(iterable).filter(|_| is_range) {
        return LoopBounds::symbolic(variable);
    }
    if iterable.is_empty() {
        LoopBounds::unknown()
    } else {
        LoopBounds::input(iterable)
    }
}

fn size_variable(text: &str) -> Option<String> {
    SIZE_ACCESS
        .captures(text)
        .and_then(|c| c.get(1))
        .or_else(|| LEN_CALL.captures(text).and_then(|c| c.get(2)))
        .map(|m| m.as_str().to_string())
}

fn numeric_bound(text: &str) -> Option<u64> {
    let caps = NUMERIC_UPPER.captures(text)?;
    [2, 3, 4, 5]
        .iter()
        .filter_map(|&i| caps.get(i))
        .find_map(|m| m.as_str().parse().ok())
}

fn identifier_bound(text: &str) -> Option<String> {
    IDENT_UPPER.captures_iter(text).find_map(|caps| {
        [2, 3, 4, 5]
            .iter()
            .filter_map(|&i| caps.get(i))
            .map(|m| m.as_str())
            .find(|name| !is_keyword(name))
            .map(str::to_string)
    })
}

fn is_keyword(word: &str) -> bool {
    matches!(
        word,
        "true" | "false" | "True" | "False" | "None" | "null" | "nil" | "undefined" | "in" | "of"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_bound_is_input() {
        let bounds = classify_loop_header("let i = 0; i < arr.length; i++");
        assert_eq!(bounds.kind, BoundKind::Input);
        assert_eq!(bounds.cost, CostExpr::n());
        assert_eq!(bounds.variable.as_deref(), Some("arr"));
    }

    #[test]
    fn test_len_call_is_input() {
        let bounds = classify_loop_header("i < len(items)");
        assert_eq!(bounds.kind, BoundKind::Input);
        assert_eq!(bounds.variable.as_deref(), Some("items"));
    }

    #[test]
    fn test_numeric_literal_is_constant() {
        let bounds = classify_loop_header("int i = 0; i < 10; i++");
        assert_eq!(bounds.kind, BoundKind::Constant);
        assert_eq!(bounds.cost, CostExpr::constant(10));
        assert_eq!(bounds.growth(), LoopGrowth::Constant);
    }

    #[test]
    fn test_halving_is_logarithmic() {
        let bounds = classify_loop_header("lo <= hi; mid = lo + hi / 2");
        assert_eq!(bounds.cost, CostExpr::log_n());
        let doubling = classify_loop_header("i = 1; i < n; i *= 2");
        assert_eq!(doubling.growth(), LoopGrowth::Logarithmic);
    }

    #[test]
    fn test_identifier_bound_is_symbolic() {
        let bounds = classify_loop_header("i = 0; i < n; i++");
        assert_eq!(bounds.kind, BoundKind::Symbolic);
        assert_eq!(bounds.variable.as_deref(), Some("n"));
        assert_eq!(bounds.growth(), LoopGrowth::Linear);
    }

    #[test]
    fn test_countdown_to_zero_is_not_constant() {
        let bounds = classify_loop_header("i = n; i >= 0; i--");
        assert_ne!(bounds.kind, BoundKind::Constant);
    }

    #[test]
    fn test_unclassifiable_is_unknown() {
        let bounds = classify_loop_header("true");
        assert_eq!(bounds.kind, BoundKind::Unknown);
        assert_eq!(bounds.growth(), LoopGrowth::Linear);
    }

    #[test]
    fn test_collection_iteration() {
        assert_eq!(collection_iteration("items").kind, BoundKind::Input);
        assert_eq!(collection_iteration("range(5)").kind, BoundKind::Constant);
        assert_eq!(collection_iteration("range(n)").kind, BoundKind::Symbolic);
        assert_eq!(collection_iteration("range(len(xs))").variable.as_deref(), Some("xs"));
        assert_eq!(collection_iteration("range(0, 10)").kind, BoundKind::Constant);
        assert_eq!(collection_iteration("0..n").kind, BoundKind::Symbolic);
        assert_eq!(collection_iteration("0..v.len()").variable.as_deref(), Some("v"));
    }
}
