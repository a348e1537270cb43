//! Characterization pipeline and the orchestration around it.
//!
//! [`Characterizer`] runs one snippet through every detector:
//!
//! ```text
//! text ─▶ language ─▶ parse ─┬─▶ libraries ─▶ code type ─┐
//!                            ├─▶ paradigm ───────────────┼─▶ assemble
//!                            └─▶ complexity (IR|legacy) ─┘
//! ```
//!
//! A snippet that cannot be parsed still yields a record (degraded mode).
//! Empty input yields `None`. A panic inside a detector is caught here and
//! surfaced as [`Error::Analysis`] naming the phase it happened in.

pub mod batch;
pub mod cache;
pub mod debounce;
pub mod session;

use std::panic::{catch_unwind, AssertUnwindSafe};

use once_cell::sync::Lazy;
use tracing::{debug, error, info_span, warn};

use crate::adapters::AdapterRegistry;
use crate::characterization::{
    assemble, assemble_degraded, validate_translation, CodeCharacterization, DetectorOutputs,
    TranslationValidation,
};
use crate::complexity::analyze_complexity;
use crate::config::DetectionConfig;
use crate::core::{Language, ParserProvider, SyntaxTree, TreeSitterProvider};
use crate::detection::{
    analyze_libraries, analyze_paradigm, classify_code_type, LanguageDetectionResult,
    LanguageDetector,
};
use crate::errors::{Error, Result};
use crate::observability::{get_current_context, set_current_input, set_phase, AnalysisPhase};

pub use batch::{analyze_batch, BatchInput, BatchResult};
pub use cache::{CharacterizationCache, InputHash};
pub use debounce::Debouncer;
pub use session::{AnalysisSession, PollOutcome};

static DEFAULT_CHARACTERIZER: Lazy<Characterizer> = Lazy::new(Characterizer::new);

/// Characterize `source` with the bundled grammars and adapters.
///
/// Returns `Ok(None)` for empty or whitespace-only input.
pub fn analyze_code_context(source: &str) -> Result<Option<CodeCharacterization>> {
    DEFAULT_CHARACTERIZER.characterize(source)
}

/// Parser, adapters and language detector for a series of runs.
pub struct Characterizer {
    provider: Box<dyn ParserProvider>,
    registry: AdapterRegistry,
    detector: LanguageDetector,
}

impl Default for Characterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Characterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Characterizer")
            .field("registry", &self.registry)
            .field("detector", &self.detector)
            .finish()
    }
}

impl Characterizer {
    pub fn new() -> Self {
        Self::with_parts(
            Box::new(TreeSitterProvider::new()),
            AdapterRegistry::default(),
            LanguageDetector::default(),
        )
    }

    pub fn with_parts(
        provider: Box<dyn ParserProvider>,
        registry: AdapterRegistry,
        detector: LanguageDetector,
    ) -> Self {
        Self {
            provider,
            registry,
            detector,
        }
    }

    pub fn from_config(config: &DetectionConfig) -> Self {
        let registry = if config.use_adapters {
            AdapterRegistry::default()
        } else {
            AdapterRegistry::empty()
        };
        Self::with_parts(
            Box::new(TreeSitterProvider::new()),
            registry,
            LanguageDetector::new(config.fallback_language()),
        )
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    pub fn characterize(&self, source: &str) -> Result<Option<CodeCharacterization>> {
        self.characterize_labeled("<input>", source)
    }

    /// Like [`characterize`](Self::characterize), with `label` recorded in
    /// the fault context.
    pub fn characterize_labeled(
        &self,
        label: &str,
        source: &str,
    ) -> Result<Option<CodeCharacterization>> {
        if source.trim().is_empty() {
            debug!(input = label, "empty input; nothing to characterize");
            return Ok(None);
        }
        let _input = set_current_input(label);
        let span = info_span!("characterize", input = label, bytes = source.len());
        let _entered = span.enter();

        catch_unwind(AssertUnwindSafe(|| self.run(source)))
            .map(Some)
            .map_err(|payload| {
                let context = get_current_context();
                let phase = context
                    .phase
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "startup".to_string());
                let message = panic_message(payload.as_ref());
                error!(input = label, %phase, %message, "characterization failed");
                Error::Analysis(format!("{message} (during {phase})"))
            })
    }

    /// Characterize both texts and validate the second as a translation of
    /// the first. `None` when either is empty.
    pub fn compare(&self, source: &str, target: &str) -> Result<Option<TranslationValidation>> {
        let (Some(source), Some(target)) = (
            self.characterize_labeled("<source>", source)?,
            self.characterize_labeled("<target>", target)?,
        ) else {
            return Ok(None);
        };
        let _phase = set_phase(AnalysisPhase::Validation);
        Ok(Some(validate_translation(&source, &target)))
    }

    fn run(&self, source: &str) -> CodeCharacterization {
        let language = {
            let _phase = set_phase(AnalysisPhase::LanguageDetection);
            self.detector.detect(source)
        };
        let tree = {
            let _phase = set_phase(AnalysisPhase::Parsing);
            self.parse(source, language.language)
        };
        match tree {
            Some(tree) => self.characterize_tree(&tree, language),
            None => {
                let _phase = set_phase(AnalysisPhase::Assembly);
                assemble_degraded(source, language)
            }
        }
    }

    fn parse(&self, source: &str, language: Language) -> Option<SyntaxTree> {
        if !self.provider.supports(language) {
            debug!(%language, "no grammar available; degraded mode");
            return None;
        }
        match self.provider.parse(source, language) {
            Ok(tree) => Some(tree),
            Err(e) => {
                warn!(%language, error = %e, "parse failed; degraded mode");
                None
            }
        }
    }

    /// Run the tree-level detectors on an already parsed snippet.
    pub fn characterize_tree(
        &self,
        tree: &SyntaxTree,
        language: LanguageDetectionResult,
    ) -> CodeCharacterization {
        let adapter = self.registry.get(tree.language());
        let libraries = {
            let _phase = set_phase(AnalysisPhase::LibraryDetection);
            analyze_libraries(tree)
        };
        let paradigm = {
            let _phase = set_phase(AnalysisPhase::ParadigmDetection);
            analyze_paradigm(tree)
        };
        let code_type = {
            let _phase = set_phase(AnalysisPhase::CodeTypeClassification);
            classify_code_type(tree, &libraries, adapter)
        };
        let complexity = {
            let _phase = set_phase(AnalysisPhase::ComplexityAnalysis);
            analyze_complexity(tree, &self.registry)
        };

        let _phase = set_phase(AnalysisPhase::Assembly);
        assemble(
            tree,
            adapter,
            DetectorOutputs {
                language,
                libraries,
                paradigm,
                code_type,
                complexity,
            },
        )
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{CodeType, DetectionMethod, Paradigm};

    struct PanickingProvider;

    impl ParserProvider for PanickingProvider {
        fn supports(&self, _language: Language) -> bool {
            true
        }

        fn parse(&self, _source: &str, _language: Language) -> Result<SyntaxTree> {
            panic!("grammar exploded")
        }
    }

    struct FailingProvider;

    impl ParserProvider for FailingProvider {
        fn supports(&self, _language: Language) -> bool {
            true
        }

        fn parse(&self, _source: &str, language: Language) -> Result<SyntaxTree> {
            Err(Error::parse(language, "no tree"))
        }
    }

    #[test]
    fn test_empty_input_is_none() {
        assert!(analyze_code_context("").unwrap().is_none());
        assert!(analyze_code_context("  \n\t ").unwrap().is_none());
    }

    #[test]
    fn test_python_script() {
        let record = analyze_code_context(
            "import sys\n\ndef main():\n    print(sys.argv)\n\nif __name__ == '__main__':\n    main()\n",
        )
        .unwrap()
        .unwrap();
        assert_eq!(record.version, "1.0");
        assert_eq!(record.language.language, Language::Python);
        assert_eq!(record.code_type.code_type, CodeType::Script);
        assert_eq!(record.structure.function_count, 1);
        assert!(record.behavior.has_io);
    }

    #[test]
    fn test_panic_becomes_analysis_error() {
        let characterizer = Characterizer::with_parts(
            Box::new(PanickingProvider),
            AdapterRegistry::default(),
            LanguageDetector::default(),
        );
        let err = characterizer
            .characterize("package main\nfunc main() {}\n")
            .unwrap_err();
        assert!(err.is_analysis_fault());
        assert!(err.to_string().contains("grammar exploded"));
        assert!(err.to_string().contains("during parsing"));
        assert_eq!(get_current_context().phase, None);
    }

    #[test]
    fn test_parse_failure_degrades() {
        let characterizer = Characterizer::with_parts(
            Box::new(FailingProvider),
            AdapterRegistry::default(),
            LanguageDetector::default(),
        );
        let record = characterizer
            .characterize("package main\nfunc main() {}\n")
            .unwrap()
            .unwrap();
        assert_eq!(record.language.language, Language::Unknown);
        assert_eq!(record.language.confidence, 0.0);
        assert_eq!(record.language.detection_method, DetectionMethod::Fallback);
        assert!(record.language.indicators[0].starts_with("text-guess:go"));
        assert_eq!(record.paradigm.primary, Paradigm::Unknown);
        assert_eq!(record.code_type.confidence, 0.0);
        assert_eq!(record.complexity.time_complexity, "unknown");
        assert_eq!(record.structure.lines, 2);
    }

    #[test]
    fn test_compare_identical_sources() {
        let source = "function add(a, b) { return a + b; }\n";
        let validation = Characterizer::new().compare(source, source).unwrap().unwrap();
        assert!(validation.is_valid);
        assert!(Characterizer::new().compare(source, "").unwrap().is_none());
    }
}
