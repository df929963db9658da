//! Leading-trivia analysis for declarations.
//!
//! tree-sitter attaches comments and preprocessor lines to the tree as
//! extras rather than as trivia of the following token, so the run of
//! blank/comment/directive lines above a declaration is recovered from the
//! text itself. Everything here works on byte offsets into the pass's text.

use once_cell::sync::Lazy;
use regex::Regex;

/// Directives that may precede a declaration without belonging to it.
static DIRECTIVE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^#\s*(region|endregion|if|elif|else|endif|define|undef|pragma|nullable|warning|error|line)\b",
    )
    .unwrap()
});

/// Classification of a single source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Comment,
    DocComment,
    Directive,
    Code,
}

/// Classify a line of source text (without its terminator).
///
/// Only lines opening with `//` or `/*` are comments here. The inner and
/// closing lines of a multi-line block comment classify as code;
/// [`leading_trivia`] resolves them by scanning up to the opening `/*`.
pub fn classify_line(line: &str) -> LineKind {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }
    if is_doc_comment_line(trimmed) {
        return LineKind::DocComment;
    }
    if trimmed.starts_with("//") || trimmed.starts_with("/*") {
        return LineKind::Comment;
    }
    if DIRECTIVE_PATTERN.is_match(trimmed) {
        return LineKind::Directive;
    }
    LineKind::Code
}

fn is_doc_comment_line(trimmed: &str) -> bool {
    trimmed.starts_with("///") && !trimmed.starts_with("////")
}

/// A trivia line: `start` is the first byte, `end` the index of its line
/// terminator (`\r` of a CRLF pair, or `\n`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriviaLine {
    pub start: usize,
    pub end: usize,
    pub kind: LineKind,
}

/// The trivia run directly above a declaration.
#[derive(Debug, Clone)]
pub struct LeadingTrivia {
    /// Start of the declaration itself.
    pub decl_start: usize,
    /// Start of the line holding the declaration's first token.
    pub decl_line_start: usize,
    /// Trivia lines, top to bottom.
    pub lines: Vec<TriviaLine>,
    /// The declaration shares its line with preceding code.
    pub inline: bool,
}

/// Start of the line containing `pos`.
pub fn line_start(text: &str, pos: usize) -> usize {
    text[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

/// Terminator index of the line above the one starting at `line_start`.
fn previous_line_end(text: &str, line_start: usize) -> Option<usize> {
    if line_start == 0 {
        return None;
    }
    let newline = line_start - 1;
    if newline > 0 && text.as_bytes()[newline - 1] == b'\r' {
        Some(newline - 1)
    } else {
        Some(newline)
    }
}

/// Collect the trivia above the declaration starting at `decl_start`.
pub fn leading_trivia(text: &str, decl_start: usize) -> LeadingTrivia {
    let decl_line_start = line_start(text, decl_start);
    let inline = !text[decl_line_start..decl_start].trim().is_empty();

    let mut lines = Vec::new();
    if !inline {
        let mut cursor = decl_line_start;
        while let Some(end) = previous_line_end(text, cursor) {
            let start = line_start(text, end);
            let kind = classify_line(&text[start..end]);
            if kind != LineKind::Code {
                lines.push(TriviaLine { start, end, kind });
                cursor = start;
                continue;
            }
            match block_comment_above(text, start, end) {
                Some(block) => {
                    cursor = block.last().map_or(start, |l| l.start);
                    lines.extend(block);
                }
                None => break,
            }
        }
        lines.reverse();
    }

    LeadingTrivia {
        decl_start,
        decl_line_start,
        lines,
        inline,
    }
}

/// Lines of a multi-line block comment closing on the line `start..end`,
/// bottom to top. None unless the comment's `/*` opens a line, so code
/// followed by a trailing comment is not mistaken for trivia.
fn block_comment_above(text: &str, start: usize, end: usize) -> Option<Vec<TriviaLine>> {
    if !text[start..end].trim_end().ends_with("*/") {
        return None;
    }

    let mut block = Vec::new();
    let (mut start, mut end) = (start, end);
    loop {
        let line = &text[start..end];
        block.push(TriviaLine {
            start,
            end,
            kind: LineKind::Comment,
        });
        // The closing line's own `*/` must not count as an opener.
        let search = if block.len() == 1 {
            &line[..line.trim_end().len() - 2]
        } else {
            line
        };
        if search.contains("/*") {
            return line.trim_start().starts_with("/*").then_some(block);
        }
        end = previous_line_end(text, start)?;
        start = line_start(text, end);
    }
}

impl LeadingTrivia {
    /// Offset at which a documentation block for this declaration goes.
    ///
    /// Always a line terminator index, except for inline declarations (the
    /// declaration start) and declarations on the first line (0). When the
    /// trivia holds directives the offset follows the last of them and any
    /// blank lines directly after it.
    pub fn insertion_offset(&self, text: &str) -> usize {
        if self.inline {
            return self.decl_start;
        }

        if let Some(last_directive) = self
            .lines
            .iter()
            .rposition(|l| l.kind == LineKind::Directive)
        {
            let mut idx = last_directive;
            while idx + 1 < self.lines.len() && self.lines[idx + 1].kind == LineKind::Blank {
                idx += 1;
            }
            return self.lines[idx].end;
        }

        previous_line_end(text, self.decl_line_start).unwrap_or(0)
    }

    /// The `///` documentation in the trivia, one trimmed line per comment line.
    pub fn doc_comment(&self, text: &str) -> String {
        self.lines
            .iter()
            .filter(|l| l.kind == LineKind::DocComment)
            .map(|l| text[l.start..l.end].trim())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Leading whitespace width of the line holding `pos`, tabs counting as
/// one full unit.
pub fn indent_columns(text: &str, pos: usize, unit: usize) -> usize {
    let start = line_start(text, pos);
    text[start..]
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .map(|c| if c == '\t' { unit } else { 1 })
        .sum()
}

/// Indentation depth of the line holding `pos`.
pub fn indent_level(text: &str, pos: usize, unit: usize) -> usize {
    if unit == 0 {
        return 0;
    }
    indent_columns(text, pos, unit) / unit
}

/// Type declarations: modifiers, then the type keyword.
static TYPE_DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[a-z]+\s+)*(?:class|interface|enum|struct|record)\s+[@A-Za-z_]").unwrap()
});

/// An identifier, optional type arguments, then an opening parenthesis.
static CALL_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Za-z_]\w*)\s*(?:<[^()=;{}]*>)?\s*\(").unwrap()
});

/// Words that may sit directly before a `(` without naming a method.
const NON_METHOD_WORDS: &[&str] = &[
    "public", "private", "protected", "internal", "file", "static", "abstract", "virtual",
    "override", "sealed", "new", "async", "partial", "readonly", "extern", "unsafe", "this",
    "base", "operator", "implicit", "explicit", "typeof", "nameof", "sizeof", "default", "ref",
    "out", "in", "params", "return", "await",
];

/// Source text with the documentation of types and methods taken out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrippedText {
    pub text: String,
    /// Declarations whose documentation was removed. Each one must get its
    /// documentation back from the retained pass.
    pub stripped_declarations: usize,
}

/// Remove the `///` documentation of type and method declarations,
/// terminators included.
///
/// The result is the "clean" text whose declaration offsets are valid
/// insertion points for regenerated documentation. A run is removed only
/// when it sits directly on the declaration (attribute lines aside), so
/// re-inserting it above the declaration restores the original layout.
/// Runs separated from their declaration by blank lines, comments or
/// directives stay in place, as does the documentation of members that are
/// never re-emitted (properties, fields, enum members, delegates, events,
/// destructors, operators).
pub fn strip_doc_comments(text: &str) -> StrippedText {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();

    // (run range, declaration line, directly attached)
    let mut runs: Vec<(std::ops::Range<usize>, usize, bool)> = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        if !is_doc_comment_line(lines[i].trim_start()) {
            i += 1;
            continue;
        }
        let run_start = i;
        while i < lines.len() && is_doc_comment_line(lines[i].trim_start()) {
            i += 1;
        }
        if let Some((target, attached)) = documented_line(&lines, i) {
            // A run below an attribute lies inside the declaration.
            let after_attribute = run_start > 0 && is_attribute_line(lines[run_start - 1].trim());
            runs.push((run_start..i, target, attached && !after_attribute));
        }
    }

    let mut keep = vec![true; lines.len()];
    let mut stripped_declarations = 0;
    let mut idx = 0;
    while idx < runs.len() {
        let target = runs[idx].1;
        let group_end = runs[idx..]
            .iter()
            .position(|r| r.1 != target)
            .map_or(runs.len(), |n| idx + n);
        let group = &runs[idx..group_end];
        idx = group_end;

        // Several runs for one declaration means one of them is detached.
        let removable = group.len() == 1
            && group[0].2
            && is_type_or_method_declaration(skip_attributes(lines[target].trim()));
        if removable {
            keep[group[0].0.clone()].iter_mut().for_each(|k| *k = false);
            stripped_declarations += 1;
        }
    }

    let text = lines
        .iter()
        .zip(keep)
        .filter(|(_, keep)| *keep)
        .map(|(line, _)| *line)
        .collect();
    StrippedText {
        text,
        stripped_declarations,
    }
}

/// Index of the first declaration line at or after `from`, and whether
/// only attribute lines separate it from `from`. Blank, comment, directive
/// and further `///` lines are passed over but detach the run.
fn documented_line(lines: &[&str], from: usize) -> Option<(usize, bool)> {
    let mut attached = true;
    for (offset, line) in lines[from..].iter().enumerate() {
        let trimmed = line.trim();
        if classify_line(trimmed) != LineKind::Code {
            attached = false;
            continue;
        }
        if skip_attributes(trimmed).is_empty() {
            continue;
        }
        return Some((from + offset, attached));
    }
    None
}

fn is_attribute_line(trimmed: &str) -> bool {
    trimmed.starts_with('[') && skip_attributes(trimmed).is_empty()
}

/// The part of a line after any leading `[...]` attribute groups.
fn skip_attributes(line: &str) -> &str {
    let mut rest = line;
    while rest.starts_with('[') {
        let mut depth = 0usize;
        let mut close = None;
        for (idx, c) in rest.char_indices() {
            match c {
                '[' => depth += 1,
                ']' => {
                    depth -= 1;
                    if depth == 0 {
                        close = Some(idx);
                        break;
                    }
                }
                _ => {}
            }
        }
        match close {
            Some(idx) => rest = rest[idx + 1..].trim_start(),
            // Attribute continues on the next line.
            None => return "",
        }
    }
    rest
}

fn is_type_or_method_declaration(line: &str) -> bool {
    if TYPE_DECLARATION.is_match(line) {
        return true;
    }

    // Destructors and operators have no slot in the model.
    if line.starts_with('~') || line.contains(" ~") {
        return false;
    }
    let mut words = line.split(|c: char| !c.is_alphanumeric() && c != '_');
    if words.any(|w| matches!(w, "delegate" | "event" | "operator")) {
        return false;
    }

    // Parameter defaults and bodies come after the name, so anything past the
    // first `=`, `{` or `;` is irrelevant.
    let head = line.split(['=', '{', ';']).next().unwrap_or(line);
    CALL_SHAPE
        .captures_iter(head)
        .any(|caps| !NON_METHOD_WORDS.contains(&&caps[1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_line() {
        assert_eq!(classify_line("   "), LineKind::Blank);
        assert_eq!(classify_line("    /// <summary>"), LineKind::DocComment);
        assert_eq!(classify_line("    //// banner"), LineKind::Comment);
        assert_eq!(classify_line("    // note"), LineKind::Comment);
        assert_eq!(classify_line("    #region Helpers"), LineKind::Directive);
        assert_eq!(classify_line("#endregion"), LineKind::Directive);
        assert_eq!(classify_line("#if DEBUG"), LineKind::Directive);
        assert_eq!(classify_line("    #pragma warning disable CS0168"), LineKind::Directive);
        assert_eq!(classify_line("    {"), LineKind::Code);
    }

    #[test]
    fn test_insertion_offset_is_end_of_previous_line() {
        let text = "class A\n{\n    public void F() {}\n}\n";
        let decl = text.find("public").unwrap();
        let trivia = leading_trivia(text, decl);
        assert_eq!(trivia.insertion_offset(text), text.find("{\n").unwrap() + 1);
    }

    #[test]
    fn test_insertion_offset_skips_region() {
        let text = "class A\n{\n    #region Api\n    public void F() {}\n    #endregion\n}\n";
        let decl = text.find("public").unwrap();
        let trivia = leading_trivia(text, decl);
        assert!(trivia.lines.iter().any(|l| l.kind == LineKind::Directive));
        let offset = trivia.insertion_offset(text);
        assert_eq!(&text[..offset], "class A\n{\n    #region Api");
    }

    #[test]
    fn test_insertion_offset_after_directive_and_blank_lines() {
        let text = "#endregion\n\n// keep\nclass A {}\n";
        let decl = text.find("class").unwrap();
        let trivia = leading_trivia(text, decl);
        let offset = trivia.insertion_offset(text);
        assert_eq!(&text[..offset], "#endregion\n");
    }

    #[test]
    fn test_insertion_offset_first_line() {
        let text = "class A {}\n";
        let trivia = leading_trivia(text, 0);
        assert_eq!(trivia.insertion_offset(text), 0);
    }

    #[test]
    fn test_insertion_offset_inline_declaration() {
        let text = "namespace N { class A {} }";
        let decl = text.find("class").unwrap();
        let trivia = leading_trivia(text, decl);
        assert!(trivia.inline);
        assert_eq!(trivia.insertion_offset(text), decl);
    }

    #[test]
    fn test_crlf_insertion_offset_points_at_carriage_return() {
        let text = "class A\r\n{\r\n    void F() {}\r\n}\r\n";
        let decl = text.find("void").unwrap();
        let offset = leading_trivia(text, decl).insertion_offset(text);
        assert_eq!(&text[offset..offset + 2], "\r\n");
        assert_eq!(&text[..offset], "class A\r\n{");
    }

    #[test]
    fn test_doc_comment_collection() {
        let text = "class A\n{\n    /// <summary>\n    /// Does F.\n    /// </summary>\n    [Obsolete]\n    public void F() {}\n}\n";
        let decl = text.find("[Obsolete]").unwrap();
        let trivia = leading_trivia(text, decl);
        assert_eq!(
            trivia.doc_comment(text),
            "/// <summary>\n/// Does F.\n/// </summary>"
        );
    }

    #[test]
    fn test_indent_level() {
        let text = "namespace N\n{\n    class A\n    {\n\t\tvoid F() {}\n    }\n}\n";
        assert_eq!(indent_level(text, text.find("class").unwrap(), 4), 1);
        assert_eq!(indent_level(text, text.find("void").unwrap(), 4), 2);
        assert_eq!(indent_level(text, 0, 4), 0);
    }

    #[test]
    fn test_strip_keeps_member_documentation() {
        let text = "class A\n{\n    /// The name.\n    public string Name { get; set; }\n    /// Count.\n    public int Count => Compute();\n    /// Pair.\n    private (int, int) _pair;\n    /// Fires.\n    public event EventHandler Changed;\n    /// Handler.\n    public delegate void Handler(object sender);\n}\n";
        let stripped = strip_doc_comments(text);
        assert_eq!(stripped.text, text);
        assert_eq!(stripped.stripped_declarations, 0);
    }

    #[test]
    fn test_strip_method_shapes() {
        let text = "class A\n{\n    /// a\n    [Test, Category(\"x\")]\n    public (int, int) GetPair() => (1, 2);\n    /// b\n    public T Find<T>(int id = 0) where T : class { }\n    /// c\n    [Obsolete] public A(int x) : base(x) { }\n}\n";
        assert_eq!(
            strip_doc_comments(text).text,
            "class A\n{\n    [Test, Category(\"x\")]\n    public (int, int) GetPair() => (1, 2);\n    public T Find<T>(int id = 0) where T : class { }\n    [Obsolete] public A(int x) : base(x) { }\n}\n"
        );
    }

    #[test]
    fn test_strip_doc_comments() {
        let text = "/// <summary>\n/// A.\n/// </summary>\nclass A\n{\n    //// banner\n    /// x\n    void F() {}\n}\n";
        let stripped = strip_doc_comments(text);
        assert_eq!(stripped.text, "class A\n{\n    //// banner\n    void F() {}\n}\n");
        assert_eq!(stripped.stripped_declarations, 2);
    }

    #[test]
    fn test_strip_keeps_destructor_and_operator_documentation() {
        let text = "class Handle\n{\n    /// <summary>Releases the native handle.</summary>\n    ~Handle() { }\n\n    /// <summary>Wraps a raw value.</summary>\n    public static implicit operator Handle(int raw) => new Handle();\n\n    /// <summary>Adds.</summary>\n    public static Handle operator +(Handle a, Handle b) => a;\n}\n";
        let stripped = strip_doc_comments(text);
        assert_eq!(stripped.text, text);
        assert_eq!(stripped.stripped_declarations, 0);
    }

    #[test]
    fn test_strip_keeps_detached_documentation() {
        // A comment, blank line or directive between the run and the method
        // would move the run if it were removed and re-inserted.
        let text = "class Cart\n{\n    /// <summary>Empties the cart.</summary>\n    // Not thread safe.\n    public void Clear() { }\n\n    /// <summary>Adds.</summary>\n\n    public void Add() { }\n\n    /// <summary>Logs.</summary>\n#if DEBUG\n    public void Log() { }\n#endif\n\n    [Obsolete]\n    /// <summary>Old.</summary>\n    public void Old() { }\n}\n";
        let stripped = strip_doc_comments(text);
        assert_eq!(stripped.text, text);
        assert_eq!(stripped.stripped_declarations, 0);
    }

    #[test]
    fn test_strip_keeps_every_run_of_a_split_comment() {
        let text = "class A\n{\n    /// first\n\n    /// second\n    void F() {}\n}\n";
        assert_eq!(strip_doc_comments(text).text, text);
    }

    #[test]
    fn test_code_lines_resembling_block_comments() {
        assert_eq!(classify_line("        *p = 5;"), LineKind::Code);
        assert_eq!(classify_line("    Run(); /* later */"), LineKind::Code);
        assert_eq!(classify_line("    /* note */"), LineKind::Comment);

        let text = "unsafe class A\n{\n    int* p;\n    void G() { *p = 5; }\n    int x = 1; /* trailing */\n    void F() {}\n}\n";
        let trivia = leading_trivia(text, text.find("void F").unwrap());
        assert!(trivia.lines.is_empty());
        assert_eq!(
            trivia.insertion_offset(text),
            text.find(" /* trailing */").unwrap() + " /* trailing */".len()
        );
    }

    #[test]
    fn test_multi_line_block_comment_is_trivia() {
        let text = "class A\n{\n    int x;\n    /*\n     * Legacy entry point.\n     */\n    void F() {}\n}\n";
        let trivia = leading_trivia(text, text.find("void F").unwrap());
        assert_eq!(trivia.lines.len(), 3);
        assert!(trivia.lines.iter().all(|l| l.kind == LineKind::Comment));
        assert_eq!(&text[trivia.lines[0].start..trivia.lines[0].end], "    /*");
    }
}
