use serde::{Deserialize, Serialize};

use crate::core::Language;
use crate::detection::signals::{self, SignalKind};

/// One behavioral signal found in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorSource {
    pub kind: SignalKind,
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorProfile {
    pub is_deterministic: bool,
    pub has_side_effects: bool,
    pub has_io: bool,
    pub is_async: bool,
    pub sources: Vec<BehaviorSource>,
}

impl Default for BehaviorProfile {
    fn default() -> Self {
        Self {
            is_deterministic: true,
            has_side_effects: false,
            has_io: false,
            is_async: false,
            sources: Vec::new(),
        }
    }
}

impl BehaviorProfile {
    /// Labels of the sources matching `filter`, in scan order.
    pub fn labels(&self, filter: impl Fn(SignalKind) -> bool) -> Vec<&str> {
        self.sources
            .iter()
            .filter(|source| filter(source.kind))
            .map(|source| source.label.as_str())
            .collect()
    }
}

/// Behavior is read from the text, so it is available even without a tree.
pub fn analyze_behavior(source: &str, language: Language) -> BehaviorProfile {
    let hits = signals::scan(source, language);
    let any = |pred: fn(SignalKind) -> bool| hits.iter().any(|hit| pred(hit.kind));

    BehaviorProfile {
        is_deterministic: !any(SignalKind::is_nondeterministic),
        has_side_effects: any(SignalKind::is_side_effect),
        has_io: any(SignalKind::is_io),
        is_async: any(|kind| kind == SignalKind::Async),
        sources: hits
            .iter()
            .map(|hit| BehaviorSource {
                kind: hit.kind,
                label: hit.label.to_string(),
                count: hit.count,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pure_function_is_deterministic() {
        let profile = analyze_behavior("function add(a, b) { return a + b; }", Language::JavaScript);
        assert_eq!(profile, BehaviorProfile::default());
    }

    #[test]
    fn test_python_io_and_randomness() {
        let profile = analyze_behavior(
            "import random\nprint(random.randint(1, 6))\n",
            Language::Python,
        );
        assert!(profile.has_io);
        assert!(profile.has_side_effects);
        assert!(!profile.is_deterministic);
        assert_eq!(profile.labels(SignalKind::is_io), vec!["print"]);
    }

    #[test]
    fn test_async_rust() {
        let profile = analyze_behavior(
            "async fn fetch() -> u32 { load().await }",
            Language::Rust,
        );
        assert!(profile.is_async);
        assert!(!profile.has_io);
    }
}
