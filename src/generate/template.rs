//! Rule-based summaries built from identifiers.
//!
//! No model of the code's behaviour is involved: `GetOrderCount` becomes
//! "Gets the order count.", a constructor of `Cart` becomes "Initializes a
//! new instance of the Cart class." It is the offline default and the
//! fallback of the HTTP generator.

use std::collections::BTreeMap;

use super::{returns_value, GeneratedSummary, SummaryContext, SummaryGenerator, SummaryTarget};
use crate::analysis::StructureKind;

/// Leading verbs and the sentence each one opens with. `{}` is the rest of
/// the name, humanized.
const VERB_PHRASES: &[(&str, &str)] = &[
    ("Get", "Gets the {}"),
    ("Set", "Sets the {}"),
    ("Is", "Determines whether the instance is {}"),
    ("Has", "Determines whether the instance has {}"),
    ("Can", "Determines whether the instance can {}"),
    ("Try", "Attempts to {}"),
    ("Create", "Creates a new {}"),
    ("Build", "Builds the {}"),
    ("Add", "Adds the {}"),
    ("Remove", "Removes the {}"),
    ("Delete", "Deletes the {}"),
    ("Update", "Updates the {}"),
    ("Load", "Loads the {}"),
    ("Read", "Reads the {}"),
    ("Fetch", "Fetches the {}"),
    ("Find", "Finds the {}"),
    ("Save", "Saves the {}"),
    ("Write", "Writes the {}"),
    ("Validate", "Validates the {}"),
    ("Handle", "Handles the {}"),
    ("On", "Handles the {} event"),
    ("To", "Converts the instance to {}"),
    ("Parse", "Parses the {}"),
    ("Calculate", "Calculates the {}"),
    ("Compute", "Computes the {}"),
    ("Register", "Registers the {}"),
    ("Initialize", "Initializes the {}"),
    ("Reset", "Resets the {}"),
    ("Clear", "Clears the {}"),
    ("Start", "Starts the {}"),
    ("Stop", "Stops the {}"),
    ("Send", "Sends the {}"),
    ("Process", "Processes the {}"),
];

#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateGenerator;

impl TemplateGenerator {
    pub fn new() -> Self {
        Self
    }

    fn structure_summary(&self, context: &SummaryContext) -> String {
        let words = humanize(&context.name);
        let mut summary = match context.structure_kind.unwrap_or(StructureKind::Class) {
            StructureKind::Class => format!("Represents the {}.", words),
            StructureKind::Interface => {
                let name = context
                    .name
                    .strip_prefix('I')
                    .filter(|rest| rest.starts_with(|c: char| c.is_uppercase()))
                    .unwrap_or(&context.name);
                format!("Defines the contract for the {}.", humanize(name))
            }
            StructureKind::Enum => format!("Specifies the {} values.", words),
            StructureKind::Record => format!("Immutable record describing the {}.", words),
            StructureKind::Struct => format!("Value type holding the {}.", words),
        };

        if !context.base_type.is_empty() {
            summary.push_str(&format!(" Extends {}.", context.base_type));
        }
        summary
    }

    fn method_summary(&self, context: &SummaryContext) -> String {
        let name = context.name.strip_suffix("Async").unwrap_or(&context.name);
        if name == "Dispose" {
            return "Releases the resources used by this instance.".to_string();
        }

        let mut sentence = verb_sentence(name);
        if context.is_async {
            sentence.push_str(" asynchronously");
        }
        sentence.push('.');
        sentence
    }

    fn returns(&self, context: &SummaryContext) -> Option<String> {
        if context.target != SummaryTarget::Method || !returns_value(&context.return_type) {
            return None;
        }

        let return_type = context.return_type.trim();
        if return_type == "bool" {
            return Some("true if the operation succeeded; otherwise false.".to_string());
        }
        if is_task_of(return_type) {
            return Some("A task that yields the result of the operation.".to_string());
        }

        let name = context.name.strip_suffix("Async").unwrap_or(&context.name);
        let subject = split_verb(name)
            .map(|(_, rest)| rest)
            .filter(|rest| !rest.is_empty())
            .unwrap_or(return_type);
        Some(format!("The {}.", humanize(subject)))
    }
}

impl SummaryGenerator for TemplateGenerator {
    fn name(&self) -> &'static str {
        "template"
    }

    fn generate(&self, context: &SummaryContext) -> GeneratedSummary {
        let summary = match context.target {
            SummaryTarget::Structure => self.structure_summary(context),
            SummaryTarget::Constructor => {
                let owner = context.enclosing_type.as_deref().unwrap_or(&context.name);
                format!("Initializes a new instance of the {} class.", owner)
            }
            SummaryTarget::Method => self.method_summary(context),
        };

        let parameters: BTreeMap<String, String> = context
            .parameters
            .iter()
            .map(|p| (p.name.clone(), describe_parameter(&p.name, &p.type_name)))
            .collect();

        GeneratedSummary {
            summary,
            parameters,
            returns: self.returns(context),
        }
    }
}

fn verb_sentence(name: &str) -> String {
    match split_verb(name) {
        Some((phrase, rest)) if !rest.is_empty() => phrase.replace("{}", &humanize(rest)),
        _ => format!("Performs the {} operation", humanize(name)),
    }
}

/// Split a leading verb off a PascalCase name.
fn split_verb(name: &str) -> Option<(&'static str, &str)> {
    VERB_PHRASES.iter().find_map(|(verb, phrase)| {
        let rest = name.strip_prefix(verb)?;
        // The verb must end at a word boundary: `Island` is not `Is` + `land`.
        if rest.is_empty() || rest.starts_with(|c: char| c.is_uppercase() || c == '_') {
            Some((*phrase, rest.trim_start_matches('_')))
        } else {
            None
        }
    })
}

fn describe_parameter(name: &str, type_name: &str) -> String {
    match type_name.trim() {
        "CancellationToken" => "A token to cancel the operation.".to_string(),
        "bool" => format!("Whether {}.", humanize(name)),
        _ => format!("The {}.", humanize(name)),
    }
}

fn is_task_of(return_type: &str) -> bool {
    let simple = return_type.rsplit('.').next().unwrap_or(return_type);
    simple.starts_with("Task<") || simple.starts_with("ValueTask<")
}

/// Turn an identifier into lowercase words: `HttpClientFactory` becomes
/// `http client factory`, `_maxRetries` becomes `max retries`. Acronyms of
/// two or more capitals are kept (`XMLReader` becomes `XML reader`).
pub fn humanize(identifier: &str) -> String {
    let simple = identifier.split('<').next().unwrap_or(identifier);
    let chars: Vec<char> = simple.chars().collect();

    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        let prev = i.checked_sub(1).map(|p| chars[p]);
        let next = chars.get(i + 1).copied();
        let boundary = match prev {
            Some(p) if c.is_uppercase() => {
                p.is_lowercase()
                    || p.is_ascii_digit()
                    || (p.is_uppercase() && next.is_some_and(|n| n.is_lowercase()))
            }
            Some(p) if c.is_ascii_digit() => p.is_alphabetic(),
            _ => false,
        };
        if boundary && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .into_iter()
        .map(|w| {
            let is_acronym = w.chars().count() > 1 && w.chars().all(|c| !c.is_lowercase());
            if is_acronym {
                w
            } else {
                w.to_lowercase()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
