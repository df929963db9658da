//! Structural model extracted from C# sources.
//!
//! Descriptors are plain values: an extraction pass builds them once, and
//! every later stage (merge, offset shifting) produces new values instead of
//! mutating the ones it was given.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureKind {
    Class,
    Interface,
    Enum,
    Record,
    Struct,
}

impl StructureKind {
    /// Convert to a string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            StructureKind::Class => "class",
            StructureKind::Interface => "interface",
            StructureKind::Enum => "enum",
            StructureKind::Record => "record",
            StructureKind::Struct => "struct",
        }
    }

    /// Map a tree-sitter node kind to a structure kind.
    pub fn from_node_kind(kind: &str) -> Option<Self> {
        match kind {
            "class_declaration" => Some(StructureKind::Class),
            "interface_declaration" => Some(StructureKind::Interface),
            "enum_declaration" => Some(StructureKind::Enum),
            "record_declaration" | "record_struct_declaration" => Some(StructureKind::Record),
            "struct_declaration" => Some(StructureKind::Struct),
            _ => None,
        }
    }
}

impl fmt::Display for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One enum member with its resolved integer value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumMember {
    pub name: String,
    pub value: i64,
    /// Raw text of an explicit initializer (`= 5`), if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initializer: Option<String>,
}

/// A method or constructor parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDesc {
    pub name: String,
    pub type_name: String,
    pub has_default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Filled by the summary generator, never by extraction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A property or field declared on a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDesc {
    pub name: String,
    pub type_name: String,
    /// `true` for properties, `false` for fields.
    pub is_property: bool,
}

/// Key used to recognise the same method across two extraction passes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodKey {
    pub name: String,
    pub access_modifier: String,
    pub parameters: Vec<(String, String)>,
}

/// A method or constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDesc {
    /// Byte offset before which generated documentation is inserted.
    pub start_offset: usize,
    /// Access modifier text, e.g. `public` or `protected internal`. Empty
    /// when the declaration relies on the default accessibility.
    pub access_modifier: String,
    pub attributes: Vec<String>,
    pub name: String,
    /// Empty for constructors.
    pub return_type: String,
    pub parameters: Vec<ParameterDesc>,
    pub indent_level: usize,
    pub body: String,
    pub is_async: bool,
    pub is_task: bool,
    pub is_constructor: bool,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_override: bool,
    pub is_virtual: bool,
    pub is_sealed: bool,
    pub is_new: bool,
    /// Documentation found in the source (retained pass only).
    pub existing_summary: String,
    pub generated_summary: String,
}

impl MethodDesc {
    /// Identity key: name, access modifier and ordered parameter shape.
    pub fn key(&self) -> MethodKey {
        MethodKey {
            name: self.name.clone(),
            access_modifier: self.access_modifier.clone(),
            parameters: self
                .parameters
                .iter()
                .map(|p| (p.name.clone(), p.type_name.clone()))
                .collect(),
        }
    }

    /// Human readable signature, e.g. `public Task<int> CountAsync(string name)`.
    pub fn signature(&self) -> String {
        let params = self
            .parameters
            .iter()
            .map(|p| match &p.default_value {
                Some(default) => format!("{} {} = {}", p.type_name, p.name, default),
                None => format!("{} {}", p.type_name, p.name),
            })
            .collect::<Vec<_>>()
            .join(", ");

        let mut head = Vec::new();
        if !self.access_modifier.is_empty() {
            head.push(self.access_modifier.as_str());
        }
        if self.is_static {
            head.push("static");
        }
        if self.is_async {
            head.push("async");
        }
        if !self.return_type.is_empty() {
            head.push(self.return_type.as_str());
        }
        head.push(self.name.as_str());

        format!("{}({})", head.join(" "), params)
    }
}

/// One declared type (class, interface, enum, record or struct).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureDesc {
    pub file_path: String,
    pub start_offset: usize,
    /// End of the declaration, extended by the spans of nested structures
    /// (see `indent_shift_code`).
    pub end_offset: usize,
    /// Sum of the spans of structures nested inside this one.
    pub indent_shift_code: usize,
    pub indent_level: usize,
    pub kind: StructureKind,
    pub namespace: String,
    pub imports: Vec<String>,
    pub name: String,
    pub modifiers: Vec<String>,
    /// Empty when the type has no base class.
    pub base_type: String,
    pub interfaces: Vec<String>,
    pub attributes: Vec<String>,
    pub existing_summary: String,
    pub generated_summary: String,
    pub methods: Vec<MethodDesc>,
    pub properties: Vec<PropertyDesc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_members: Option<Vec<EnumMember>>,
}

impl StructureDesc {
    /// Span length before nested-structure correction.
    pub fn raw_span(&self) -> usize {
        self.end_offset
            .saturating_sub(self.indent_shift_code)
            .saturating_sub(self.start_offset)
    }

    /// Whether `other` lies entirely within this structure's raw range.
    pub fn contains(&self, other: &StructureDesc) -> bool {
        let end = self.start_offset + self.raw_span();
        let other_end = other.start_offset + other.raw_span();
        self.start_offset <= other.start_offset
            && other_end <= end
            && self.raw_span() > other.raw_span()
    }

    /// Find a method by name.
    pub fn find_method(&self, name: &str) -> Option<&MethodDesc> {
        self.methods.iter().find(|m| m.name == name)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_method_key_includes_parameter_shape() {
        let a = method("Foo", "public", &[("x", "int")]);
        let b = method("Foo", "public", &[("x", "int"), ("y", "int")]);
        let c = method("Foo", "private", &[("x", "int")]);

        assert_eq!(a.key(), method("Foo", "public", &[("x", "int")]).key());
        assert_ne!(a.key(), b.key());
        assert_ne!(a.key(), c.key());
    }

    #[test]
    fn test_method_signature() {
        let mut m = method("CountAsync", "public", &[("name", "string")]);
        m.return_type = "Task<int>".to_string();
        m.is_async = true;
        m.parameters[0].default_value = Some("null".to_string());
        assert_eq!(
            m.signature(),
            "public async Task<int> CountAsync(string name = null)"
        );
    }

    #[test]
    fn test_structure_containment() {
        let outer = structure("Outer", 0, 200);
        let inner = structure("Inner", 50, 150);
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(!outer.contains(&outer.clone()));
    }

    #[test]
    fn test_structure_kind_serializes_lowercase() {
        let json = serde_json::to_string(&StructureKind::Record).unwrap();
        assert_eq!(json, "\"record\"");
    }
}
