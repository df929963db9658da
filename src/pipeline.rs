//! Per-file extract, merge, generate and inject pipeline.
//!
//! Files are independent: each one goes through both extraction passes,
//! the merge, summary generation and injection on its own, and the batch
//! runs them in parallel with rayon. A failing file is recorded in the
//! report and never stops the others.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;

use crate::analysis::{
    get_analyzer, strip_doc_comments, ExtractOptions, LanguageAnalyzer, ParameterDesc,
    StrippedText, StructureDesc,
};
use crate::config::Config;
use crate::error::PipelineError;
use crate::generate::{build_generator, render_doc_comment, SummaryContext, SummaryGenerator};
use crate::inject::{inject, shift_structures, Insertion};
use crate::matcher::merge;

/// What happened to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// New text was produced (and written, unless dry-run).
    Updated,
    Unchanged,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileError {
    pub kind: &'static str,
    pub message: String,
}

impl From<&PipelineError> for FileError {
    fn from(e: &PipelineError) -> Self {
        Self {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

/// Result for one file of a batch.
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub path: String,
    pub status: FileStatus,
    /// Merged model; offsets refer to the final text when documented.
    pub structures: Vec<StructureDesc>,
    /// Summaries produced by the generator.
    pub generated: usize,
    /// Existing summaries written back unchanged.
    pub preserved: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FileError>,
}

impl FileOutcome {
    fn failed(path: &Path, error: &PipelineError) -> Self {
        log::warn!("{}", error);
        Self {
            path: path.to_string_lossy().to_string(),
            status: FileStatus::Failed,
            structures: Vec::new(),
            generated: 0,
            preserved: 0,
            error: Some(error.into()),
        }
    }
}

/// Results for a whole batch, in input order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub dry_run: bool,
    pub files: Vec<FileOutcome>,
}

impl BatchReport {
    /// Every structure of every successfully processed file.
    pub fn structures(&self) -> impl Iterator<Item = &StructureDesc> {
        self.files.iter().flat_map(|f| f.structures.iter())
    }

    pub fn failed_count(&self) -> usize {
        self.count(FileStatus::Failed)
    }

    pub fn updated_count(&self) -> usize {
        self.count(FileStatus::Updated)
    }

    pub fn has_failures(&self) -> bool {
        self.failed_count() > 0
    }

    pub fn generated_count(&self) -> usize {
        self.files.iter().map(|f| f.generated).sum()
    }

    pub fn preserved_count(&self) -> usize {
        self.files.iter().map(|f| f.preserved).sum()
    }

    fn count(&self, status: FileStatus) -> usize {
        self.files.iter().filter(|f| f.status == status).count()
    }
}

/// Output of documenting one source text.
#[derive(Debug, Clone)]
pub struct Documented {
    pub text: String,
    pub structures: Vec<StructureDesc>,
    pub generated: usize,
    pub preserved: usize,
}

/// Both extraction passes of one text, merged.
struct Passes {
    /// Source with type and method documentation removed.
    clean: String,
    /// Declarations whose documentation is missing from `clean`.
    stripped_declarations: usize,
    /// Extraction of `clean`.
    stripped: Vec<StructureDesc>,
    merged: Vec<StructureDesc>,
}

/// How one documentation slot is filled.
enum Plan {
    /// Write this text back (existing documentation).
    Keep(String),
    /// Use the generator result at this index.
    Generate(usize),
    Skip,
}

pub struct Pipeline {
    config: Config,
    generator: Box<dyn SummaryGenerator>,
    dry_run: bool,
}

impl Pipeline {
    /// Create a pipeline using the generator named in `config`.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let generator = build_generator(&config.generator)?;
        Ok(Self::with_generator(config, generator))
    }

    pub fn with_generator(config: Config, generator: Box<dyn SummaryGenerator>) -> Self {
        Self {
            config,
            generator,
            dry_run: false,
        }
    }

    /// Compute new text without writing files.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    fn options(&self) -> ExtractOptions {
        ExtractOptions {
            indent_unit: self.config.indent_unit,
        }
    }

    fn analyzer_for(path: &Path) -> Result<&'static dyn LanguageAnalyzer, PipelineError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        get_analyzer(ext)
            .ok_or_else(|| PipelineError::UnsupportedLanguage(path.to_string_lossy().to_string()))
    }

    fn extract_passes(&self, path: &Path, source: &str) -> Result<Passes, PipelineError> {
        let analyzer = Self::analyzer_for(path)?;
        let options = self.options();
        let StrippedText {
            text: clean,
            stripped_declarations,
        } = strip_doc_comments(source);

        let (stripped, retained) = rayon::join(
            || analyzer.extract(&clean, path, &options),
            || analyzer.extract(source, path, &options),
        );
        let stripped = stripped?;
        let retained = retained?;

        let merged = merge(&stripped, &retained);
        Ok(Passes {
            clean,
            stripped_declarations,
            stripped,
            merged,
        })
    }

    /// Merged structural model of `source`, without generating anything.
    pub fn analyze_source(
        &self,
        path: &Path,
        source: &str,
    ) -> Result<Vec<StructureDesc>, PipelineError> {
        Ok(self.extract_passes(path, source)?.merged)
    }

    /// Produce the documented text of `source`.
    pub fn document_source(&self, path: &Path, source: &str) -> Result<Documented, PipelineError> {
        let display = path.to_string_lossy().to_string();
        let passes = self.extract_passes(path, source)?;

        let recovered = recovered_declarations(&passes);
        if recovered != passes.stripped_declarations {
            return Err(PipelineError::analysis(
                &display,
                format!(
                    "documentation of {} declarations was stripped but {} were recovered",
                    passes.stripped_declarations, recovered
                ),
            ));
        }

        // Plan every slot first so the generator sees the whole file at once.
        let mut contexts = Vec::new();
        let mut plans: Vec<(Plan, Vec<Plan>)> = Vec::with_capacity(passes.merged.len());
        for (merged, stripped) in passes.merged.iter().zip(&passes.stripped) {
            let own = self.plan(
                &merged.existing_summary,
                !stripped.existing_summary.is_empty(),
                self.config.document_structures,
                || SummaryContext::for_structure(merged),
                &mut contexts,
            );
            let methods = merged
                .methods
                .iter()
                .zip(&stripped.methods)
                .map(|(method, stripped_method)| {
                    self.plan(
                        &method.existing_summary,
                        !stripped_method.existing_summary.is_empty(),
                        self.config.document_methods,
                        || SummaryContext::for_method(merged, method),
                        &mut contexts,
                    )
                })
                .collect();
            plans.push((own, methods));
        }

        let results = if contexts.is_empty() {
            Vec::new()
        } else {
            log::debug!(
                "{}: requesting {} summaries from {} generator",
                display,
                contexts.len(),
                self.generator.name()
            );
            self.generator.generate_batch(&contexts)
        };

        let mut generated = 0;
        let mut preserved = 0;
        let mut insertions = Vec::new();
        let mut documented = Vec::with_capacity(passes.merged.len());

        for (structure, (own_plan, method_plans)) in passes.merged.iter().zip(&plans) {
            let mut structure = structure.clone();

            for (method, plan) in structure.methods.iter_mut().zip(method_plans) {
                let text = match plan {
                    Plan::Keep(text) => {
                        preserved += 1;
                        text.clone()
                    }
                    Plan::Generate(idx) => {
                        let result = &results[*idx];
                        fill_parameter_descriptions(&mut method.parameters, result);
                        let text = render_doc_comment(&contexts[*idx], result);
                        if !text.is_empty() {
                            generated += 1;
                        }
                        text
                    }
                    Plan::Skip => continue,
                };
                method.generated_summary = text.clone();
                insertions.push(Insertion {
                    offset: method.start_offset,
                    text,
                    indent_level: method.indent_level,
                });
            }

            // The type's own block goes after its methods.
            let own_text = match own_plan {
                Plan::Keep(text) => {
                    preserved += 1;
                    Some(text.clone())
                }
                Plan::Generate(idx) => {
                    let text = render_doc_comment(&contexts[*idx], &results[*idx]);
                    if !text.is_empty() {
                        generated += 1;
                    }
                    Some(text)
                }
                Plan::Skip => None,
            };
            if let Some(text) = own_text {
                structure.generated_summary = text.clone();
                insertions.push(Insertion {
                    offset: structure.start_offset,
                    text,
                    indent_level: structure.indent_level,
                });
            }

            documented.push(structure);
        }

        let injected = inject(&passes.clean, &insertions, self.config.indent_unit).map_err(
            |source| PipelineError::Inject {
                path: display.clone(),
                source,
            },
        )?;

        Ok(Documented {
            structures: shift_structures(&documented, &injected.edits),
            text: injected.text,
            generated,
            preserved,
        })
    }

    /// Decide how one slot is filled.
    ///
    /// `still_present` means the documentation survived stripping; it is
    /// already in the text and must not be written a second time.
    fn plan(
        &self,
        existing: &str,
        still_present: bool,
        enabled: bool,
        context: impl FnOnce() -> SummaryContext,
        contexts: &mut Vec<SummaryContext>,
    ) -> Plan {
        if still_present {
            return Plan::Skip;
        }
        let has_existing = !existing.trim().is_empty();
        if has_existing && (!self.config.regenerate_existing || !enabled) {
            return Plan::Keep(existing.to_string());
        }
        if !enabled {
            return Plan::Skip;
        }
        contexts.push(context());
        Plan::Generate(contexts.len() - 1)
    }

    /// Extract and merge every file without changing anything.
    pub fn analyze(&self, files: &[PathBuf]) -> BatchReport {
        let outcomes = files
            .par_iter()
            .map(|path| {
                let result = read_source(path).and_then(|source| self.analyze_source(path, &source));
                match result {
                    Ok(structures) => {
                        log::debug!("{}: {} structures", path.display(), structures.len());
                        FileOutcome {
                            path: path.to_string_lossy().to_string(),
                            status: FileStatus::Unchanged,
                            structures,
                            generated: 0,
                            preserved: 0,
                            error: None,
                        }
                    }
                    Err(e) => FileOutcome::failed(path, &e),
                }
            })
            .collect();

        BatchReport {
            dry_run: true,
            files: outcomes,
        }
    }

    /// Document every file and write the results back.
    pub fn analyze_and_document(&self, files: &[PathBuf]) -> BatchReport {
        let outcomes = files
            .par_iter()
            .map(|path| match self.process_file(path) {
                Ok(outcome) => outcome,
                Err(e) => FileOutcome::failed(path, &e),
            })
            .collect();

        BatchReport {
            dry_run: self.dry_run,
            files: outcomes,
        }
    }

    fn process_file(&self, path: &Path) -> Result<FileOutcome, PipelineError> {
        let source = read_source(path)?;
        let documented = self.document_source(path, &source)?;

        let status = if documented.text == source {
            FileStatus::Unchanged
        } else {
            if !self.dry_run {
                write_atomic(path, &documented.text)
                    .map_err(|e| PipelineError::io(path.to_string_lossy(), e))?;
            }
            FileStatus::Updated
        };

        log::debug!(
            "{}: {:?}, {} generated, {} preserved",
            path.display(),
            status,
            documented.generated,
            documented.preserved
        );

        Ok(FileOutcome {
            path: path.to_string_lossy().to_string(),
            status,
            structures: documented.structures,
            generated: documented.generated,
            preserved: documented.preserved,
            error: None,
        })
    }
}

/// Slots whose documentation exists only in the retained pass.
fn recovered_declarations(passes: &Passes) -> usize {
    let moved = |retained: &str, stripped: &str| !retained.is_empty() && stripped.is_empty();
    passes
        .merged
        .iter()
        .zip(&passes.stripped)
        .map(|(merged, stripped)| {
            let own = usize::from(moved(&merged.existing_summary, &stripped.existing_summary));
            let methods = merged
                .methods
                .iter()
                .zip(&stripped.methods)
                .filter(|(m, s)| moved(&m.existing_summary, &s.existing_summary))
                .count();
            own + methods
        })
        .sum()
}

fn fill_parameter_descriptions(
    parameters: &mut [ParameterDesc],
    generated: &crate::generate::GeneratedSummary,
) {
    for param in parameters {
        if let Some(description) = generated.parameters.get(&param.name) {
            param.description = Some(description.clone());
        }
    }
}

fn read_source(path: &Path) -> Result<String, PipelineError> {
    fs::read_to_string(path).map_err(|e| PipelineError::io(path.to_string_lossy(), e))
}

/// Replace the contents of `path` in one step.
///
/// The text goes to a temporary file in the same directory which is then
/// renamed over the original, so readers see either the old or the new
/// contents. The original's permissions are carried over.
pub fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(contents.as_bytes())?;
    temp.as_file().sync_all()?;
    if let Ok(metadata) = fs::metadata(path) {
        fs::set_permissions(temp.path(), metadata.permissions())?;
    }
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{GeneratedSummary, TemplateGenerator};

    fn pipeline() -> Pipeline {
        Pipeline::with_generator(Config::default(), Box::new(TemplateGenerator::new()))
    }

    /// Answers every request with an empty summary.
    struct EmptyGenerator;

    impl SummaryGenerator for EmptyGenerator {
        fn name(&self) -> &'static str {
            "empty"
        }

        fn generate(&self, _context: &SummaryContext) -> GeneratedSummary {
            GeneratedSummary::default()
        }
    }

    const SOURCE: &str = r#"namespace Shop
{
    public class Cart
    {
        public int GetTotal(int discount)
        {
            return 0;
        }
    }
}
"#;

    #[test]
    fn test_document_source() {
        let documented = pipeline().document_source(Path::new("Cart.cs"), SOURCE).unwrap();

        assert_eq!(
            documented.text,
            r#"namespace Shop
{
    /// <summary>
    /// Represents the cart.
    /// </summary>
    public class Cart
    {
        /// <summary>
        /// Gets the total.
        /// </summary>
        /// <param name="discount">The discount.</param>
        /// <returns>The total.</returns>
        public int GetTotal(int discount)
        {
            return 0;
        }
    }
}
"#
        );
        assert_eq!(documented.generated, 2);
        assert_eq!(documented.preserved, 0);

        let cart = &documented.structures[0];
        assert!(documented.text[cart.start_offset..].starts_with("\n    /// <summary>"));
        assert_eq!(
            cart.methods[0].parameters[0].description.as_deref(),
            Some("The discount.")
        );
    }

    #[test]
    fn test_document_source_is_idempotent() {
        let p = pipeline();
        let once = p.document_source(Path::new("Cart.cs"), SOURCE).unwrap();
        let twice = p.document_source(Path::new("Cart.cs"), &once.text).unwrap();

        assert_eq!(once.text, twice.text);
        assert_eq!(twice.generated, 0);
        assert_eq!(twice.preserved, 2);
    }

    #[test]
    fn test_empty_summaries_change_nothing() {
        let source = r#"namespace Shop
{
    /// <summary>
    /// A cart.
    /// </summary>
    public class Cart
    {
        /// <summary>Totals.</summary>
        public int GetTotal(int discount)
        {
            return 0;
        }

        public void Clear() { }
    }

    public enum Size { Small, Large = 4 }
}
"#;
        let p = Pipeline::with_generator(Config::default(), Box::new(EmptyGenerator));
        let documented = p.document_source(Path::new("Cart.cs"), source).unwrap();

        assert_eq!(documented.text, source);
        assert_eq!(documented.generated, 0);
        assert_eq!(documented.preserved, 2);
        assert_eq!(
            p.analyze_source(Path::new("Cart.cs"), &documented.text).unwrap(),
            p.analyze_source(Path::new("Cart.cs"), source).unwrap()
        );
    }

    #[test]
    fn test_destructor_and_operator_docs_survive() {
        let source = r#"public class Handle
{
    /// <summary>Releases the native handle.</summary>
    ~Handle() { }

    /// <summary>Wraps a raw value.</summary>
    public static implicit operator Handle(int raw) => new Handle();
}
"#;
        let documented = pipeline().document_source(Path::new("Handle.cs"), source).unwrap();

        assert!(documented.text.contains(
            "    /// <summary>Releases the native handle.</summary>\n    ~Handle() { }"
        ));
        assert!(documented.text.contains(
            "    /// <summary>Wraps a raw value.</summary>\n    public static implicit operator"
        ));
        assert!(documented.text.starts_with("/// <summary>\n/// Represents the handle.\n"));
    }

    #[test]
    fn test_doc_above_comment_stays_in_place() {
        let source = r#"public class Cart
{
    /// <summary>Empties the cart.</summary>
    // Not thread safe.
    public void Clear() { }
}
"#;
        let documented = pipeline().document_source(Path::new("Cart.cs"), source).unwrap();

        assert!(documented.text.contains(
            "    /// <summary>Empties the cart.</summary>\n    // Not thread safe.\n    public void Clear() { }"
        ));
        assert_eq!(documented.text.matches("Empties the cart.").count(), 1);
        assert_eq!(documented.generated, 1);
    }

    #[test]
    fn test_existing_summary_kept_verbatim() {
        let source = r#"public class Cart
{
    /// <summary>Hand written.</summary>
    public void Clear() { }
}
"#;
        let documented = pipeline().document_source(Path::new("Cart.cs"), source).unwrap();
        assert!(documented
            .text
            .contains("    /// <summary>Hand written.</summary>\n    public void Clear()"));
        assert_eq!(documented.text.matches("Hand written").count(), 1);
        assert_eq!(documented.preserved, 1);
    }

    #[test]
    fn test_regenerate_existing_replaces_summary() {
        let source = "public class Cart\n{\n    /// old\n    public void ClearItems() { }\n}\n";
        let config = Config {
            regenerate_existing: true,
            document_structures: false,
            ..Config::default()
        };
        let p = Pipeline::with_generator(config, Box::new(TemplateGenerator::new()));
        let documented = p.document_source(Path::new("Cart.cs"), source).unwrap();

        assert!(!documented.text.contains("/// old"));
        assert!(documented.text.contains("    /// Clears the items.\n"));
    }

    #[test]
    fn test_disabled_methods_keep_their_docs() {
        let source = "public class Cart\n{\n    /// old\n    public void Clear() { }\n\n    public void Add() { }\n}\n";
        let config = Config {
            document_methods: false,
            document_structures: false,
            regenerate_existing: true,
            ..Config::default()
        };
        let p = Pipeline::with_generator(config, Box::new(TemplateGenerator::new()));
        let documented = p.document_source(Path::new("Cart.cs"), source).unwrap();
        assert_eq!(documented.text, source);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = pipeline()
            .document_source(Path::new("main.rs"), "fn main() {}")
            .unwrap_err();
        assert_eq!(err.kind(), "unsupported");
    }

    #[test]
    fn test_write_atomic_replaces_contents() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("A.cs");
        fs::write(&path, "old").unwrap();

        write_atomic(&path, "new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
