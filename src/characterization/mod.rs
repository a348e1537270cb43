//! The versioned characterization record and the layers derived for it.
//!
//! Fields may be added within a version; none is removed or repurposed.

pub mod assembler;
pub mod behavior;
pub mod elements;
pub mod intent;
pub mod readiness;
pub mod structure;
pub mod validator;

use serde::{Deserialize, Serialize};

use crate::complexity::ComplexityAnalysisResult;
use crate::core::Language;
use crate::detection::{
    CodeTypeResult, DetectionMethod, LanguageDetectionResult, LibraryAnalysisResult,
    ParadigmAnalysisResult,
};

pub use assembler::{assemble, assemble_degraded, truncate_to_budget, DetectorOutputs};
pub use behavior::{BehaviorProfile, BehaviorSource};
pub use elements::{ClassElement, CodeElements, ConditionElement, FunctionElement};
pub use intent::{IntentAnalysis, IntentCategory, IntentScore};
pub use readiness::{ReadinessFactors, ReadinessScores};
pub use structure::StructureMetrics;
pub use validator::{validate_translation, Tolerance, TranslationValidation, ValidationCheck};

pub const CHARACTERIZATION_VERSION: &str = "1.0";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guidance {
    pub prompt_hints: Vec<String>,
    pub focus_areas: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeCharacterization {
    pub version: String,
    pub language: LanguageDetectionResult,
    pub libraries: LibraryAnalysisResult,
    pub paradigm: ParadigmAnalysisResult,
    pub code_type: CodeTypeResult,
    pub complexity: ComplexityAnalysisResult,
    pub structure: StructureMetrics,
    pub behavior: BehaviorProfile,
    pub elements: CodeElements,
    pub intent: IntentAnalysis,
    pub readiness: ReadinessScores,
    pub guidance: Guidance,
}

impl Default for CodeCharacterization {
    fn default() -> Self {
        Self {
            version: CHARACTERIZATION_VERSION.to_string(),
            language: LanguageDetectionResult {
                language: Language::Unknown,
                dialect: None,
                confidence: 0.0,
                indicators: Vec::new(),
                detection_method: DetectionMethod::Fallback,
            },
            libraries: LibraryAnalysisResult::default(),
            paradigm: ParadigmAnalysisResult::unknown(),
            code_type: CodeTypeResult::unknown(),
            complexity: ComplexityAnalysisResult::unknown(),
            structure: StructureMetrics::default(),
            behavior: BehaviorProfile::default(),
            elements: CodeElements::default(),
            intent: IntentAnalysis::default(),
            readiness: ReadinessScores::default(),
            guidance: Guidance::default(),
        }
    }
}

impl CodeCharacterization {
    pub fn to_json(&self) -> crate::errors::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
