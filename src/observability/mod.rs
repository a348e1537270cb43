//! Context tracking for fault reports.
//!
//! The pipeline sets a phase guard around each detector. When a detector
//! panics, the fault is caught at the entry point and logged together with
//! the phase and input that were active.
//!
//! ```ignore
//! use codeprint::observability::{set_phase, AnalysisPhase};
//!
//! let _phase = set_phase(AnalysisPhase::Parsing);
//! // a fault here is reported as happening during `parsing`
//! ```

pub mod context;

pub use context::{
    get_current_context, reset_context, set_current_input, set_phase, AnalysisContext,
    AnalysisPhase, ContextGuard,
};
