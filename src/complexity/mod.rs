//! Algorithmic complexity estimation.
//!
//! Two paths produce a [`ComplexityAnalysisResult`]: the IR path (a language
//! adapter is registered) and the legacy path working directly on the CST.
//! The IR path is authoritative whenever it is available.

pub mod analyzer;
pub mod cost_expr;
pub mod legacy;
pub mod suggestions;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::adapters::AdapterRegistry;
use crate::core::SyntaxTree;
use crate::ir::IrBuilder;

pub use analyzer::analyze_program;
pub use cost_expr::CostExpr;
pub use suggestions::{OptimizationSuggestion, SuggestionKind};

pub const UNKNOWN_COMPLEXITY: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityMethod {
    /// Derived from the semantic IR
    Ir,
    /// Adapter-free heuristics over the CST
    Legacy,
    /// No CST was available
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionComplexity {
    pub name: String,
    pub line: usize,
    pub time_complexity: String,
    pub space_complexity: String,
    pub is_recursive: bool,
    pub loop_depth: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexityAnalysisResult {
    pub time_complexity: String,
    pub space_complexity: String,
    pub time_cost: Option<CostExpr>,
    pub space_cost: Option<CostExpr>,
    pub input_sizes: Vec<String>,
    pub dominant_operations: Vec<String>,
    pub optimization_suggestions: Vec<OptimizationSuggestion>,
    pub method: ComplexityMethod,
    pub confidence: f64,
    pub functions: Vec<FunctionComplexity>,
}

impl ComplexityAnalysisResult {
    /// Degraded-mode value.
    pub fn unknown() -> Self {
        Self {
            time_complexity: UNKNOWN_COMPLEXITY.to_string(),
            space_complexity: UNKNOWN_COMPLEXITY.to_string(),
            time_cost: None,
            space_cost: None,
            input_sizes: Vec::new(),
            dominant_operations: Vec::new(),
            optimization_suggestions: Vec::new(),
            method: ComplexityMethod::None,
            confidence: 0.0,
            functions: Vec::new(),
        }
    }

    pub(crate) fn from_costs(time: CostExpr, space: CostExpr, method: ComplexityMethod) -> Self {
        let time = time.reduce();
        let space = space.reduce();
        Self {
            time_complexity: time.to_big_o(),
            space_complexity: space.to_big_o(),
            time_cost: Some(time),
            space_cost: Some(space),
            method,
            ..Self::unknown()
        }
    }

    pub fn is_exponential(&self) -> bool {
        self.time_cost
            .as_ref()
            .map(CostExpr::is_exponential)
            .unwrap_or(false)
    }
}

impl Default for ComplexityAnalysisResult {
    fn default() -> Self {
        Self::unknown()
    }
}

/// Run the IR path when `registry` has an adapter for the tree's language,
/// the legacy path otherwise.
pub fn analyze_complexity(tree: &SyntaxTree, registry: &AdapterRegistry) -> ComplexityAnalysisResult {
    match registry.get(tree.language()) {
        Some(adapter) => {
            let program = IrBuilder::new(adapter).build(tree);
            analyze_program(&program)
        }
        None => {
            debug!(language = %tree.language(), "no adapter registered, using CST heuristics");
            legacy::analyze_cst(tree)
        }
    }
}
