//! docweave - structural analysis and XML documentation for C# sources.
//!
//! docweave reads C# files, builds a structural model of the types and
//! methods they declare, recovers the `/// <summary>` documentation already
//! present, and writes documentation for the declarations that lack it.
//!
//! # Architecture
//!
//! - `analysis`: tree-sitter extraction of types, methods and trivia
//! - `matcher`: merges the stripped and retained extraction passes
//! - `generate`: summary generators (rule-based and HTTP)
//! - `inject`: offset-stable insertion of documentation blocks
//! - `pipeline`: per-file orchestration and batch processing
//! - `config`: YAML configuration
//! - `report`: output formatting (text, JSON)
//!
//! # Adding a New Language
//!
//! See `src/analysis/languages/` for the C# analyzer. Implement
//! `LanguageAnalyzer` and register it in `languages/mod.rs`.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod generate;
pub mod inject;
pub mod matcher;
pub mod pipeline;
pub mod report;

pub use analysis::{
    register_analyzers, CSharpAnalyzer, LanguageAnalyzer, MethodDesc, StructureDesc,
    StructureKind,
};
pub use config::Config;
pub use error::{InjectError, PipelineError};
pub use generate::{GeneratedSummary, SummaryContext, SummaryGenerator, TemplateGenerator};
pub use inject::{apply_edits, inject, TextEdit};
pub use matcher::merge;
pub use pipeline::{BatchReport, FileStatus, Pipeline};

/// Initialize all subsystems.
///
/// Call this once at startup.
pub fn init() {
    register_analyzers();
}
