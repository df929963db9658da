//! Summary generation.
//!
//! A generator receives a [`SummaryContext`] describing one type or method
//! and returns prose. What produces the prose is opaque to the rest of the
//! crate: two generators ship here, a rule-based one and a client for a
//! remote summarization service.

mod http;
mod template;

pub use http::{GeneratorError, HttpGenerator};
pub use template::{humanize, TemplateGenerator};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::{MethodDesc, ParameterDesc, StructureDesc, StructureKind};
use crate::config::{GeneratorConfig, GeneratorKind};

/// What a summary is being written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryTarget {
    Structure,
    Method,
    Constructor,
}

/// Everything a generator may use to describe one declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryContext {
    pub target: SummaryTarget,
    /// Set when `target` is a structure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure_kind: Option<StructureKind>,
    pub name: String,
    /// Type declaring the method; `None` for structures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enclosing_type: Option<String>,
    pub signature: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub existing_summary: String,
    #[serde(default)]
    pub parameters: Vec<ParameterDesc>,
    #[serde(default)]
    pub return_type: String,
    #[serde(default)]
    pub is_async: bool,
    #[serde(default)]
    pub base_type: String,
    #[serde(default)]
    pub interfaces: Vec<String>,
}

impl SummaryContext {
    /// Context for a type declaration.
    pub fn for_structure(structure: &StructureDesc) -> Self {
        let mut head: Vec<&str> = structure.modifiers.iter().map(String::as_str).collect();
        head.push(structure.kind.as_str());
        head.push(&structure.name);

        Self {
            target: SummaryTarget::Structure,
            structure_kind: Some(structure.kind),
            name: structure.name.clone(),
            enclosing_type: None,
            signature: head.join(" "),
            body: String::new(),
            existing_summary: structure.existing_summary.clone(),
            parameters: Vec::new(),
            return_type: String::new(),
            is_async: false,
            base_type: structure.base_type.clone(),
            interfaces: structure.interfaces.clone(),
        }
    }

    /// Context for a method or constructor of `owner`.
    pub fn for_method(owner: &StructureDesc, method: &MethodDesc) -> Self {
        Self {
            target: if method.is_constructor {
                SummaryTarget::Constructor
            } else {
                SummaryTarget::Method
            },
            structure_kind: None,
            name: method.name.clone(),
            enclosing_type: Some(owner.name.clone()),
            signature: method.signature(),
            body: method.body.clone(),
            existing_summary: method.existing_summary.clone(),
            parameters: method.parameters.clone(),
            return_type: method.return_type.clone(),
            is_async: method.is_async || method.is_task,
            base_type: String::new(),
            interfaces: Vec::new(),
        }
    }
}

/// Generator output for one declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedSummary {
    pub summary: String,
    /// Description per parameter name.
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
    #[serde(default)]
    pub returns: Option<String>,
}

/// A source of documentation text.
///
/// Implementations never fail: an item that cannot be described yields an
/// empty summary, which inserts nothing.
pub trait SummaryGenerator: Send + Sync {
    /// Short name for logs and reports.
    fn name(&self) -> &'static str;

    fn generate(&self, context: &SummaryContext) -> GeneratedSummary;

    /// Generate for many items; results are in input order.
    fn generate_batch(&self, contexts: &[SummaryContext]) -> Vec<GeneratedSummary> {
        contexts.iter().map(|c| self.generate(c)).collect()
    }
}

/// Build the generator selected by `config`.
pub fn build_generator(config: &GeneratorConfig) -> anyhow::Result<Box<dyn SummaryGenerator>> {
    match config.kind {
        GeneratorKind::Template => Ok(Box::new(TemplateGenerator::new())),
        GeneratorKind::Http => Ok(Box::new(HttpGenerator::from_config(config)?)),
    }
}

/// Render a summary as C# XML documentation lines, unindented.
///
/// Returns an empty string when the summary text is blank.
pub fn render_doc_comment(context: &SummaryContext, generated: &GeneratedSummary) -> String {
    let summary = generated.summary.trim();
    if summary.is_empty() {
        return String::new();
    }

    let mut lines = vec!["/// <summary>".to_string()];
    lines.extend(summary.lines().map(|l| format!("/// {}", escape_xml(l.trim()))));
    lines.push("/// </summary>".to_string());

    for param in &context.parameters {
        let description = generated
            .parameters
            .get(&param.name)
            .map(|d| d.trim())
            .unwrap_or("");
        lines.push(format!(
            "/// <param name=\"{}\">{}</param>",
            escape_xml(&param.name),
            escape_xml(description)
        ));
    }

    if let Some(returns) = generated.returns.as_deref().map(str::trim) {
        if !returns.is_empty() && returns_value(&context.return_type) {
            lines.push(format!("/// <returns>{}</returns>", escape_xml(returns)));
        }
    }

    lines.join("\n")
}

/// Whether a return type carries a value worth a `<returns>` tag.
pub fn returns_value(return_type: &str) -> bool {
    !matches!(return_type.trim(), "" | "void" | "Task" | "ValueTask")
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::{method, structure};

    #[test]
    fn test_render_doc_comment() {
        let owner = structure("Repo", 0, 10);
        let mut m = method("Find", "public", &[("id", "int"), ("filter", "string")]);
        m.return_type = "List<Item>".to_string();
        let context = SummaryContext::for_method(&owner, &m);

        let generated = GeneratedSummary {
            summary: "Finds items where a < b.".to_string(),
            parameters: BTreeMap::from([("id".to_string(), "The item id.".to_string())]),
            returns: Some("Matching items.".to_string()),
        };

        assert_eq!(
            render_doc_comment(&context, &generated),
            "/// <summary>\n\
             /// Finds items where a &lt; b.\n\
             /// </summary>\n\
             /// <param name=\"id\">The item id.</param>\n\
             /// <param name=\"filter\"></param>\n\
             /// <returns>Matching items.</returns>"
        );
    }

    #[test]
    fn test_render_blank_summary_is_empty() {
        let context = SummaryContext::for_structure(&structure("A", 0, 10));
        assert_eq!(render_doc_comment(&context, &GeneratedSummary::default()), "");
    }

    #[test]
    fn test_no_returns_for_void_or_task() {
        let owner = structure("Repo", 0, 10);
        let mut m = method("Save", "public", &[]);
        m.return_type = "Task".to_string();
        let context = SummaryContext::for_method(&owner, &m);
        let generated = GeneratedSummary {
            summary: "Saves.".to_string(),
            returns: Some("Nothing.".to_string()),
            ..Default::default()
        };
        assert!(!render_doc_comment(&context, &generated).contains("<returns>"));
    }

    #[test]
    fn test_context_serializes_target() {
        let owner = structure("Repo", 0, 10);
        let mut ctor = method("Repo", "public", &[]);
        ctor.is_constructor = true;
        let json = serde_json::to_value(SummaryContext::for_method(&owner, &ctor)).unwrap();
        assert_eq!(json["target"], "constructor");
        assert_eq!(json["enclosing_type"], "Repo");

        let json = serde_json::to_value(SummaryContext::for_structure(&owner)).unwrap();
        assert_eq!(json["target"], "structure");
        assert_eq!(json["structure_kind"], "class");
        assert_eq!(json["signature"], "public class Repo");
    }
}
