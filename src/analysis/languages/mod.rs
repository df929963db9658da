//! Language-specific analyzer implementations.

mod csharp;

pub use csharp::{parse_integer_literal, CSharpAnalyzer};

use super::LanguageAnalyzer;
use once_cell::sync::OnceCell;

/// Shared by every worker thread.
static CSHARP_ANALYZER: OnceCell<CSharpAnalyzer> = OnceCell::new();

fn csharp() -> &'static CSharpAnalyzer {
    CSHARP_ANALYZER.get_or_init(CSharpAnalyzer::new)
}

/// Build all language analyzers up front.
///
/// Optional: `get_analyzer` builds them lazily on first use.
pub fn register_analyzers() {
    csharp();
}

/// Get an analyzer for the given file extension.
///
/// Returns None if no analyzer is registered for the extension.
pub fn get_analyzer(ext: &str) -> Option<&'static dyn LanguageAnalyzer> {
    match ext {
        "cs" => Some(csharp() as &'static dyn LanguageAnalyzer),
        _ => None,
    }
}
