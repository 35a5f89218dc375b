//! Submission evaluation pipeline.
//!
//! answers -> `evaluator` (per-answer scores via `scoring`) -> `skills`
//! -> `composer` (insights, persistence, status) driven by `worker`.

pub mod composer;
pub mod evaluator;
pub mod fallback;
pub mod judge;
pub mod prompts;
pub mod scoring;
pub mod skills;
pub mod worker;
