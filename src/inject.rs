//! Splicing generated documentation into source text.
//!
//! Every insertion offset refers to the text as it was before any edit.
//! Edits are applied from the highest offset down, so an edit never moves
//! the position of one still waiting to be applied.

use serde::Serialize;

use crate::analysis::{MethodDesc, StructureDesc};
use crate::error::InjectError;

/// A raw insertion of `text` at byte `offset` of the base text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEdit {
    pub offset: usize,
    pub text: String,
}

/// A documentation block waiting to be formatted and inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    pub offset: usize,
    /// Unindented block text, one comment line per line.
    pub text: String,
    pub indent_level: usize,
}

/// Result of [`inject`]: the new text and the raw edits that produced it.
#[derive(Debug, Clone)]
pub struct Injected {
    pub text: String,
    pub edits: Vec<TextEdit>,
}

fn check_offset(base: &str, offset: usize) -> Result<(), InjectError> {
    if offset > base.len() {
        return Err(InjectError::OffsetOutOfBounds {
            offset,
            len: base.len(),
        });
    }
    if !base.is_char_boundary(offset) {
        return Err(InjectError::NotCharBoundary(offset));
    }
    Ok(())
}

/// Apply `edits` to `base`.
///
/// All offsets are validated before anything is spliced, so an invalid edit
/// yields an error and no partial text. Edits sharing an offset appear in the
/// output in input order.
pub fn apply_edits(base: &str, edits: &[TextEdit]) -> Result<String, InjectError> {
    for edit in edits {
        check_offset(base, edit.offset)?;
    }

    let mut order: Vec<usize> = (0..edits.len()).collect();
    // Highest offset first; among equal offsets the later edit goes in first
    // so the earlier one ends up in front of it.
    order.sort_by(|&a, &b| {
        edits[b]
            .offset
            .cmp(&edits[a].offset)
            .then_with(|| b.cmp(&a))
    });

    let extra: usize = edits.iter().map(|e| e.text.len()).sum();
    let mut result = String::with_capacity(base.len() + extra);
    result.push_str(base);
    for idx in order {
        let edit = &edits[idx];
        result.insert_str(edit.offset, &edit.text);
    }
    Ok(result)
}

/// Line ending used by the file: CRLF if it contains any, LF otherwise.
pub fn line_ending(text: &str) -> &'static str {
    if text.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

/// Indent each line of `text` and drop leading and trailing blank lines.
pub fn format_block(text: &str, indent: &str, newline: &str) -> String {
    let mut lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    let first = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());

    lines[first..]
        .iter()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", indent, line)
            }
        })
        .collect::<Vec<_>>()
        .join(newline)
}

/// Format `insertions` against `source` and apply them.
///
/// The shape of each edit is decided by where its offset sits in the
/// original text: at a line break the block is preceded by a newline, at
/// offset 0 it is followed by one, and in the middle of a line it gets both
/// and the line's indentation is repeated after it. Blank blocks are
/// skipped.
pub fn inject(
    source: &str,
    insertions: &[Insertion],
    indent_unit: usize,
) -> Result<Injected, InjectError> {
    let newline = line_ending(source);
    let mut edits = Vec::with_capacity(insertions.len());

    for insertion in insertions {
        check_offset(source, insertion.offset)?;

        let indent = " ".repeat(insertion.indent_level * indent_unit);
        let block = format_block(&insertion.text, &indent, newline);
        if block.trim().is_empty() {
            continue;
        }

        let rest = &source[insertion.offset..];
        let text = if insertion.offset == 0 {
            format!("{}{}", block, newline)
        } else if rest.is_empty() || rest.starts_with('\n') || rest.starts_with("\r\n") {
            format!("{}{}", newline, block)
        } else {
            format!(
                "{}{}{}{}",
                newline,
                block,
                newline,
                line_indent(source, insertion.offset)
            )
        };

        edits.push(TextEdit {
            offset: insertion.offset,
            text,
        });
    }

    let text = apply_edits(source, &edits)?;
    Ok(Injected { text, edits })
}

fn line_indent(source: &str, offset: usize) -> &str {
    let start = source[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line = &source[start..offset];
    let width = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..width]
}

/// Offsets of `structures` moved to match the text produced by `edits`.
///
/// An edit strictly before a structure moves both of its bounds; an edit at
/// or after its start and before its end moves only the end. Method offsets
/// move for edits strictly before them.
pub fn shift_structures(structures: &[StructureDesc], edits: &[TextEdit]) -> Vec<StructureDesc> {
    structures
        .iter()
        .map(|s| {
            let raw_end = s.start_offset + s.raw_span();
            let mut start_delta = 0;
            let mut end_delta = 0;
            for edit in edits {
                let len = edit.text.len();
                if edit.offset < s.start_offset {
                    start_delta += len;
                    end_delta += len;
                } else if edit.offset < raw_end {
                    end_delta += len;
                }
            }

            StructureDesc {
                start_offset: s.start_offset + start_delta,
                end_offset: s.end_offset + end_delta,
                methods: s
                    .methods
                    .iter()
                    .map(|m| MethodDesc {
                        start_offset: m.start_offset + shift_before(m.start_offset, edits),
                        ..m.clone()
                    })
                    .collect(),
                ..s.clone()
            }
        })
        .collect()
}

fn shift_before(offset: usize, edits: &[TextEdit]) -> usize {
    edits
        .iter()
        .filter(|e| e.offset < offset)
        .map(|e| e.text.len())
        .sum()
}
