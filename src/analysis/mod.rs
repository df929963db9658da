//! Structural extraction of C# sources.
//!
//! A source file is parsed with tree-sitter and walked into a list of
//! [`StructureDesc`] values: one per declared type, each carrying its
//! methods, properties, enum members, inheritance and the byte offsets at
//! which documentation belongs.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌────────────────┐     ┌─────────────────┐
//! │ Source text │────▶│ CSharpAnalyzer │────▶│ StructureDesc[] │
//! └─────────────┘     │ (tree-sitter)  │     │   (raw ranges)  │
//!                     └────────────────┘     └─────────────────┘
//!                                                     │
//!                                                     ▼
//!                                            ┌─────────────────┐
//!                                            │ reconcile_nested│
//!                                            └─────────────────┘
//! ```
//!
//! Offsets are measured on whatever text is handed in. The pipeline runs
//! extraction twice: once on text with `///` lines removed (the offsets used
//! for injection) and once on the original text (to read existing docs).

mod inheritance;
mod languages;
mod model;
mod reconcile;
mod traits;
mod trivia;

pub use inheritance::{classify_inheritance, looks_like_interface, Inheritance};
pub use languages::{get_analyzer, parse_integer_literal, register_analyzers, CSharpAnalyzer};
pub use model::{
    EnumMember, MethodDesc, MethodKey, ParameterDesc, PropertyDesc, StructureDesc, StructureKind,
};
pub use reconcile::reconcile_nested;
pub use traits::{ExtractOptions, LanguageAnalyzer, ParsedFile};
pub use trivia::{
    indent_columns, indent_level, leading_trivia, line_start, strip_doc_comments, LeadingTrivia,
    LineKind, StrippedText,
};

#[cfg(test)]
pub(crate) use model::fixtures;
