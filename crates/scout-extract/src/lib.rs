//! Deterministic action-item extraction.
//!
//! Turns raw message text into zero or more task candidates through a
//! layered cascade: hard-skip rules reject obvious non-actionable lines,
//! name/trigger signals select directive lines, refinements kill the
//! remaining false positives, then due date and priority are inferred
//! and the title cleaned. No network, no clock -- the caller supplies
//! today's date, so the whole pipeline is a pure function.

pub mod dates;
pub mod extractor;
pub mod rules;

pub use extractor::Extractor;
pub use rules::SkipRules;
