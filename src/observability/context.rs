//! Thread-local context tracking for fault reports.
//!
//! Records which characterization phase is running and which input is being
//! analyzed, so a caught fault can say where it happened. Context is per
//! thread, so rayon batches never share it.
//!
//! Guards restore the previous context on drop, so phases nest. While a
//! thread is unwinding the context is left as it was at the fault, for the
//! handler that catches the panic to read.

use std::cell::RefCell;

thread_local! {
    static CURRENT_CONTEXT: RefCell<AnalysisContext> = const { RefCell::new(AnalysisContext::new()) };
}

/// Snapshot of what the current thread is doing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisContext {
    pub phase: Option<AnalysisPhase>,
    /// Label of the input (file path, `<stdin>`, batch index)
    pub current_input: Option<String>,
}

impl AnalysisContext {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: None,
            current_input: None,
        }
    }
}

/// Stages of one characterization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisPhase {
    LanguageDetection,
    Parsing,
    LibraryDetection,
    ParadigmDetection,
    CodeTypeClassification,
    ComplexityAnalysis,
    Assembly,
    Validation,
}

impl std::fmt::Display for AnalysisPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LanguageDetection => write!(f, "language_detection"),
            Self::Parsing => write!(f, "parsing"),
            Self::LibraryDetection => write!(f, "library_detection"),
            Self::ParadigmDetection => write!(f, "paradigm_detection"),
            Self::CodeTypeClassification => write!(f, "code_type_classification"),
            Self::ComplexityAnalysis => write!(f, "complexity_analysis"),
            Self::Assembly => write!(f, "assembly"),
            Self::Validation => write!(f, "validation"),
        }
    }
}

/// RAII guard restoring the previous context on drop.
pub struct ContextGuard {
    previous: AnalysisContext,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        if std::thread::panicking() {
            return;
        }
        CURRENT_CONTEXT.with(|ctx| {
            *ctx.borrow_mut() = self.previous.clone();
        });
    }
}

fn update(apply: impl FnOnce(&mut AnalysisContext)) -> ContextGuard {
    CURRENT_CONTEXT.with(|ctx| {
        let previous = ctx.borrow().clone();
        apply(&mut ctx.borrow_mut());
        ContextGuard { previous }
    })
}

/// Set the current phase until the guard drops.
///
/// ```ignore
/// let _phase = set_phase(AnalysisPhase::Parsing);
/// let tree = provider.parse(source, language)?;
/// ```
#[must_use]
pub fn set_phase(phase: AnalysisPhase) -> ContextGuard {
    update(|ctx| ctx.phase = Some(phase))
}

#[must_use]
pub fn set_current_input(label: impl Into<String>) -> ContextGuard {
    let label = label.into();
    update(|ctx| ctx.current_input = Some(label))
}

#[must_use]
pub fn get_current_context() -> AnalysisContext {
    CURRENT_CONTEXT.with(|ctx| ctx.borrow().clone())
}

pub fn reset_context() {
    CURRENT_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = AnalysisContext::new();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_guard_restores_previous() {
        reset_context();

        let _outer = set_phase(AnalysisPhase::Parsing);
        {
            let _inner = set_phase(AnalysisPhase::ComplexityAnalysis);
            assert_eq!(
                get_current_context().phase,
                Some(AnalysisPhase::ComplexityAnalysis)
            );
        }
        assert_eq!(get_current_context().phase, Some(AnalysisPhase::Parsing));
    }

    #[test]
    fn test_input_and_phase_nest() {
        reset_context();

        let _input = set_current_input("snippet.py");
        let _phase = set_phase(AnalysisPhase::Assembly);
        let ctx = get_current_context();
        assert_eq!(ctx.phase, Some(AnalysisPhase::Assembly));
        assert_eq!(ctx.current_input.as_deref(), Some("snippet.py"));
    }

    #[test]
    fn test_unwinding_keeps_fault_context() {
        reset_context();

        let result = std::panic::catch_unwind(|| {
            let _phase = set_phase(AnalysisPhase::ParadigmDetection);
            panic!("detector fault");
        });
        assert!(result.is_err());
        assert_eq!(
            get_current_context().phase,
            Some(AnalysisPhase::ParadigmDetection)
        );
        reset_context();
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(AnalysisPhase::LanguageDetection.to_string(), "language_detection");
        assert_eq!(
            AnalysisPhase::CodeTypeClassification.to_string(),
            "code_type_classification"
        );
    }
}
