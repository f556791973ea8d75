//! mentor - conversational programming-tutor CLI.
//!
//! Forwards user prompts to one or more completion providers, persists the
//! interaction history, and builds small study utilities (quizzes, code
//! explanation, static-analysis summaries) on top of that history.

pub mod config;
pub mod context;
pub mod error;
pub mod export;
pub mod history;
pub mod lint;
pub mod llm;
pub mod prompts;
pub mod repl;
pub mod stackoverflow;
pub mod translate;
