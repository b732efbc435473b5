//! Vital-sign triage: validation, rule evaluation, scoring, and the
//! in-progress triage interaction.

pub mod classifier;
pub mod recommendations;
pub mod rules;
pub mod session;

pub use classifier::{classify, classify_vitals, CRITICAL_SCORE_BASE, URGENT_SCORE_BASE};
pub use rules::{Finding, TriageRule, RULES};
pub use session::{SessionError, SubmissionError, SubmissionPort, TriageSession};
