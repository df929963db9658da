//! Core traits for language analysis.

use std::path::Path;

use super::{reconcile_nested, StructureDesc};
use crate::error::PipelineError;

/// Holds a parsed tree-sitter tree and the text it was parsed from.
///
/// Kept separate from the extracted model so one tree can serve several
/// walks without re-parsing.
pub struct ParsedFile {
    /// The tree-sitter parse tree.
    pub tree: tree_sitter::Tree,
    /// The text the tree's byte offsets refer to.
    pub source: String,
    /// The file path (for error reporting and descriptors).
    pub path: String,
}

impl ParsedFile {
    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: tree_sitter::Node) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    /// First syntax error in the tree, as a 1-indexed line.
    pub fn first_error_line(&self) -> Option<usize> {
        let root = self.tree.root_node();
        if !root.has_error() {
            return None;
        }

        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if node.is_error() || node.is_missing() {
                return Some(node.start_position().row + 1);
            }
            if node.has_error() {
                // Visit children in source order.
                let mut children: Vec<_> = node.children(&mut node.walk()).collect();
                children.reverse();
                stack.extend(children);
            }
        }
        Some(root.start_position().row + 1)
    }
}

/// Settings that influence how offsets and indentation are measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Spaces per indentation level.
    pub indent_unit: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self { indent_unit: 4 }
    }
}

/// Language-specific analyzer trait.
///
/// # Thread Safety
///
/// tree_sitter::Parser is not Sync, so implementations create parsers as
/// needed.
pub trait LanguageAnalyzer: Send + Sync {
    /// Returns the language identifier (e.g., "csharp").
    fn language_id(&self) -> &'static str;

    /// Returns file extensions this analyzer handles (without dot).
    fn file_extensions(&self) -> &'static [&'static str];

    /// Parse source text into a tree-sitter tree.
    ///
    /// Only fails when the parser cannot produce a tree at all; syntax
    /// errors show up as ERROR nodes and are checked by `extract`.
    fn parse(&self, path: &Path, source: &str) -> anyhow::Result<ParsedFile>;

    /// Walk a parsed file and build raw structure descriptors, in source
    /// order, before nested-structure reconciliation.
    fn extract_structures(
        &self,
        parsed: &ParsedFile,
        options: &ExtractOptions,
    ) -> anyhow::Result<Vec<StructureDesc>>;

    /// Full extraction pass: parse, reject files with syntax errors, walk,
    /// reconcile nested offsets.
    fn extract(
        &self,
        source: &str,
        path: &Path,
        options: &ExtractOptions,
    ) -> Result<Vec<StructureDesc>, PipelineError> {
        let display = path.to_string_lossy().to_string();
        let parsed = self
            .parse(path, source)
            .map_err(|e| PipelineError::analysis(&display, e))?;

        if let Some(line) = parsed.first_error_line() {
            return Err(PipelineError::Parse {
                path: display,
                line,
            });
        }

        let raw = self
            .extract_structures(&parsed, options)
            .map_err(|e| PipelineError::analysis(&display, e))?;
        Ok(reconcile_nested(&raw))
    }

    /// Check if this analyzer handles the given file extension.
    fn handles_extension(&self, ext: &str) -> bool {
        self.file_extensions().contains(&ext)
    }
}
