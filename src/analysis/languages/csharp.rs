//! C# language analyzer using tree-sitter.

use std::path::Path;

use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor};

use crate::analysis::{
    classify_inheritance, indent_level, leading_trivia, EnumMember, ExtractOptions,
    LanguageAnalyzer, MethodDesc, ParameterDesc, ParsedFile, PropertyDesc, StructureDesc,
    StructureKind,
};

/// Tree-sitter query for `using` directives (not `using` statements).
const USING_QUERY: &str = r#"
(using_directive) @using
"#;

const ACCESS_MODIFIERS: &[&str] = &["public", "private", "protected", "internal", "file"];

/// Keywords accepted as modifiers when the grammar emits them as bare tokens.
const MODIFIER_KEYWORDS: &[&str] = &[
    "public", "private", "protected", "internal", "file", "static", "abstract", "virtual",
    "override", "sealed", "new", "async", "partial", "readonly", "extern", "unsafe", "required",
    "volatile", "const",
];

pub struct CSharpAnalyzer {
    language: Language,
}

impl CSharpAnalyzer {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_c_sharp::LANGUAGE.into(),
        }
    }

    fn create_parser(&self) -> anyhow::Result<Parser> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        Ok(parser)
    }

    fn extract_imports(&self, parsed: &ParsedFile) -> anyhow::Result<Vec<String>> {
        let query = Query::new(&self.language, USING_QUERY)?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, parsed.tree.root_node(), parsed.source.as_bytes());

        let mut imports = Vec::new();
        while let Some(m) = matches.next() {
            for capture in m.captures {
                let import = normalize_using(parsed.node_text(capture.node));
                if !import.is_empty() && !imports.contains(&import) {
                    imports.push(import);
                }
            }
        }

        Ok(imports)
    }

    fn build_structure(
        &self,
        parsed: &ParsedFile,
        node: Node,
        kind: StructureKind,
        imports: &[String],
        file_namespace: Option<&str>,
        options: &ExtractOptions,
    ) -> Option<StructureDesc> {
        let text = parsed.source.as_str();
        let name = parsed.node_text(node.child_by_field_name("name")?).to_string();
        let trivia = leading_trivia(text, node.start_byte());
        let indent = indent_level(text, node.start_byte(), options.indent_unit);
        let inheritance = classify_inheritance(&base_list(parsed, node));

        let mut methods = Vec::new();
        let mut properties = Vec::new();
        let mut enum_members = None;

        if kind == StructureKind::Enum {
            enum_members = Some(enum_members_of(parsed, node));
        } else {
            if kind == StructureKind::Record {
                if let Some(list) = child_of_kind(node, "parameter_list") {
                    properties.extend(parameters_of(parsed, list).into_iter().map(|p| {
                        PropertyDesc {
                            name: p.name,
                            type_name: p.type_name,
                            is_property: true,
                        }
                    }));
                }
            }

            for member in members_of(node) {
                match member.kind() {
                    "method_declaration" | "constructor_declaration" => {
                        if let Some(method) = build_method(parsed, member, &name, indent) {
                            methods.push(method);
                        }
                    }
                    "property_declaration" => {
                        if let Some(property) = property_of(parsed, member) {
                            properties.push(property);
                        }
                    }
                    "field_declaration" => properties.extend(fields_of(parsed, member)),
                    _ => {}
                }
            }
        }

        Some(StructureDesc {
            file_path: parsed.path.clone(),
            start_offset: trivia.insertion_offset(text),
            end_offset: node.end_byte(),
            indent_shift_code: 0,
            indent_level: indent,
            kind,
            namespace: namespace_of(parsed, node, file_namespace),
            imports: imports.to_vec(),
            name,
            modifiers: modifiers_of(parsed, node),
            base_type: inheritance.base_type,
            interfaces: inheritance.interfaces,
            attributes: attributes_of(parsed, node),
            existing_summary: trivia.doc_comment(text),
            generated_summary: String::new(),
            methods,
            properties,
            enum_members,
        })
    }
}

impl Default for CSharpAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAnalyzer for CSharpAnalyzer {
    fn language_id(&self) -> &'static str {
        "csharp"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["cs"]
    }

    fn parse(&self, path: &Path, source: &str) -> anyhow::Result<ParsedFile> {
        let mut parser = self.create_parser()?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("failed to parse C# source: {}", path.display()))?;

        Ok(ParsedFile {
            tree,
            source: source.to_string(),
            path: path.to_string_lossy().to_string(),
        })
    }

    fn extract_structures(
        &self,
        parsed: &ParsedFile,
        options: &ExtractOptions,
    ) -> anyhow::Result<Vec<StructureDesc>> {
        let imports = self.extract_imports(parsed)?;
        let file_namespace = file_scoped_namespace(parsed);

        // Pre-order walk keeps outer types ahead of the types nested in them.
        let mut structures = Vec::new();
        let mut stack = vec![parsed.tree.root_node()];
        while let Some(node) = stack.pop() {
            if let Some(kind) = StructureKind::from_node_kind(node.kind()) {
                if let Some(structure) = self.build_structure(
                    parsed,
                    node,
                    kind,
                    &imports,
                    file_namespace.as_deref(),
                    options,
                ) {
                    structures.push(structure);
                }
            }

            let mut children: Vec<_> = node.named_children(&mut node.walk()).collect();
            children.reverse();
            stack.extend(children);
        }

        Ok(structures)
    }
}

fn build_method(
    parsed: &ParsedFile,
    node: Node,
    type_name: &str,
    type_indent: usize,
) -> Option<MethodDesc> {
    let text = parsed.source.as_str();
    let name = parsed.node_text(node.child_by_field_name("name")?).to_string();
    let modifiers = modifiers_of(parsed, node);
    let has = |modifier: &str| modifiers.iter().any(|m| m == modifier);

    let return_type = if node.kind() == "constructor_declaration" {
        String::new()
    } else {
        node.child_by_field_name("returns")
            .or_else(|| node.child_by_field_name("type"))
            .map(|n| squash(parsed.node_text(n)))
            .unwrap_or_default()
    };

    let parameters = node
        .child_by_field_name("parameters")
        .or_else(|| child_of_kind(node, "parameter_list"))
        .map(|list| parameters_of(parsed, list))
        .unwrap_or_default();

    let body = node
        .child_by_field_name("body")
        .or_else(|| child_of_kind(node, "block"))
        .or_else(|| child_of_kind(node, "arrow_expression_clause"))
        .map(|n| parsed.node_text(n).to_string())
        .unwrap_or_default();

    let trivia = leading_trivia(text, node.start_byte());

    Some(MethodDesc {
        start_offset: trivia.insertion_offset(text),
        access_modifier: access_modifier(&modifiers),
        attributes: attributes_of(parsed, node),
        is_constructor: name == type_name,
        is_task: is_task_type(&return_type),
        name,
        return_type,
        parameters,
        indent_level: type_indent + 1,
        body,
        is_async: has("async"),
        is_static: has("static"),
        is_abstract: has("abstract"),
        is_override: has("override"),
        is_virtual: has("virtual"),
        is_sealed: has("sealed"),
        is_new: has("new"),
        existing_summary: trivia.doc_comment(text),
        generated_summary: String::new(),
    })
}

fn parameters_of(parsed: &ParsedFile, list: Node) -> Vec<ParameterDesc> {
    let text = parsed.source.as_str();
    let mut parameters = Vec::new();

    for param in list.named_children(&mut list.walk()) {
        if param.kind() != "parameter" {
            continue;
        }

        let name_node = match param
            .child_by_field_name("name")
            .or_else(|| last_child_of_kind(param, "identifier"))
        {
            Some(n) => n,
            None => continue,
        };

        // The type is everything between the attributes and the name, so
        // `ref`, `out`, `this` and `params` stay part of it.
        let type_start = param
            .children(&mut param.walk())
            .find(|c| c.kind() != "attribute_list")
            .map(|c| c.start_byte())
            .unwrap_or(name_node.start_byte())
            .min(name_node.start_byte());
        let type_name = squash(&text[type_start..name_node.start_byte()]);

        let default_value = default_value_of(parsed, param, name_node);

        parameters.push(ParameterDesc {
            name: parsed.node_text(name_node).to_string(),
            type_name,
            has_default: default_value.is_some(),
            default_value,
            description: None,
        });
    }

    parameters
}

fn default_value_of(parsed: &ParsedFile, param: Node, name_node: Node) -> Option<String> {
    let mut after_name = false;
    for child in param.children(&mut param.walk()) {
        if child.id() == name_node.id() {
            after_name = true;
            continue;
        }
        if !after_name {
            continue;
        }
        match child.kind() {
            "equals_value_clause" => {
                return Some(squash(parsed.node_text(child).trim_start_matches('=')));
            }
            "=" => {
                return child
                    .next_named_sibling()
                    .map(|value| squash(parsed.node_text(value)));
            }
            _ => {}
        }
    }
    None
}

fn enum_members_of(parsed: &ParsedFile, node: Node) -> Vec<EnumMember> {
    let mut members = Vec::new();
    let mut next_value: i64 = 0;

    for member in members_of(node) {
        if member.kind() != "enum_member_declaration" {
            continue;
        }
        let name_node = match member
            .child_by_field_name("name")
            .or_else(|| child_of_kind(member, "identifier"))
        {
            Some(n) => n,
            None => continue,
        };

        let initializer = member
            .child_by_field_name("value")
            .map(|v| squash(parsed.node_text(v)))
            .or_else(|| {
                let mut cursor = member.walk();
                let value = member
                    .children(&mut cursor)
                    .find(|c| c.kind() == "=")
                    .and_then(|eq| eq.next_named_sibling());
                value.map(|v| squash(parsed.node_text(v)))
            });

        let value = initializer
            .as_deref()
            .and_then(parse_integer_literal)
            .unwrap_or(next_value);

        members.push(EnumMember {
            name: parsed.node_text(name_node).to_string(),
            value,
            initializer,
        });
        next_value = value.wrapping_add(1);
    }

    members
}

/// Parse a C# integer literal: decimal, hex or binary, optional sign,
/// digit separators and `u`/`l` suffixes.
pub fn parse_integer_literal(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed).trim_start()),
    };

    let digits: String = unsigned
        .trim_end_matches(['u', 'U', 'l', 'L'])
        .chars()
        .filter(|c| *c != '_')
        .collect();

    let value = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        i64::from_str_radix(hex, 16).ok()?
    } else if let Some(bin) = digits
        .strip_prefix("0b")
        .or_else(|| digits.strip_prefix("0B"))
    {
        i64::from_str_radix(bin, 2).ok()?
    } else {
        digits.parse::<i64>().ok()?
    };

    Some(if negative { -value } else { value })
}

fn property_of(parsed: &ParsedFile, node: Node) -> Option<PropertyDesc> {
    let name = node.child_by_field_name("name")?;
    let type_name = node
        .child_by_field_name("type")
        .map(|t| squash(parsed.node_text(t)))
        .unwrap_or_default();
    Some(PropertyDesc {
        name: parsed.node_text(name).to_string(),
        type_name,
        is_property: true,
    })
}

fn fields_of(parsed: &ParsedFile, node: Node) -> Vec<PropertyDesc> {
    let Some(declaration) = child_of_kind(node, "variable_declaration") else {
        return Vec::new();
    };
    let type_name = declaration
        .child_by_field_name("type")
        .map(|t| squash(parsed.node_text(t)))
        .unwrap_or_default();

    let mut cursor = declaration.walk();
    let fields = declaration
        .named_children(&mut cursor)
        .filter(|c| c.kind() == "variable_declarator")
        .filter_map(|declarator| {
            declarator
                .child_by_field_name("name")
                .or_else(|| child_of_kind(declarator, "identifier"))
        })
        .map(|name| PropertyDesc {
            name: parsed.node_text(name).to_string(),
            type_name: type_name.clone(),
            is_property: false,
        })
        .collect();
    fields
}

/// Members of a type body, looking through `#if` blocks.
fn members_of(node: Node) -> Vec<Node> {
    let body = node
        .child_by_field_name("body")
        .or_else(|| child_of_kind(node, "declaration_list"))
        .or_else(|| child_of_kind(node, "enum_member_declaration_list"));

    let mut members = Vec::new();
    if let Some(body) = body {
        collect_members(body, &mut members);
    }
    members
}

fn collect_members<'a>(container: Node<'a>, out: &mut Vec<Node<'a>>) {
    for child in container.named_children(&mut container.walk()) {
        if is_conditional_block(child.kind()) {
            collect_members(child, out);
        } else {
            out.push(child);
        }
    }
}

fn is_conditional_block(kind: &str) -> bool {
    kind.starts_with("preproc_if") || kind == "preproc_else" || kind == "preproc_elif"
}

fn modifiers_of(parsed: &ParsedFile, node: Node) -> Vec<String> {
    let name_start = node
        .child_by_field_name("name")
        .map(|n| n.start_byte())
        .unwrap_or(node.end_byte());

    let mut cursor = node.walk();
    let modifiers = node
        .children(&mut cursor)
        .take_while(|c| c.start_byte() < name_start)
        .filter_map(|c| {
            if c.kind() == "modifier" {
                Some(parsed.node_text(c).to_string())
            } else if !c.is_named() && MODIFIER_KEYWORDS.contains(&c.kind()) {
                Some(c.kind().to_string())
            } else {
                None
            }
        })
        .collect();
    modifiers
}

fn access_modifier(modifiers: &[String]) -> String {
    modifiers
        .iter()
        .filter(|m| ACCESS_MODIFIERS.contains(&m.as_str()))
        .cloned()
        .collect::<Vec<_>>()
        .join(" ")
}

fn attributes_of(parsed: &ParsedFile, node: Node) -> Vec<String> {
    let mut cursor = node.walk();
    let attributes = node
        .children(&mut cursor)
        .filter(|c| c.kind() == "attribute_list")
        .map(|c| squash(parsed.node_text(c)))
        .collect();
    attributes
}

fn base_list(parsed: &ParsedFile, node: Node) -> Vec<String> {
    let Some(list) = child_of_kind(node, "base_list") else {
        return Vec::new();
    };

    let mut cursor = list.walk();
    let entries = list
        .named_children(&mut cursor)
        .filter(|c| c.kind() != "comment")
        .map(|c| {
            let text = parsed.node_text(c);
            if c.kind() == "primary_constructor_base_type" {
                squash(text.split('(').next().unwrap_or(text))
            } else {
                squash(text)
            }
        })
        .filter(|s| !s.is_empty())
        .collect();
    entries
}

fn namespace_of(parsed: &ParsedFile, node: Node, file_namespace: Option<&str>) -> String {
    let mut parts = Vec::new();
    let mut saw_file_scoped = false;
    let mut current = node.parent();

    while let Some(n) = current {
        if matches!(
            n.kind(),
            "namespace_declaration" | "file_scoped_namespace_declaration"
        ) {
            saw_file_scoped |= n.kind() == "file_scoped_namespace_declaration";
            if let Some(name) = n.child_by_field_name("name") {
                parts.push(squash(parsed.node_text(name)));
            }
        }
        current = n.parent();
    }
    parts.reverse();

    if !saw_file_scoped {
        if let Some(ns) = file_namespace {
            parts.insert(0, ns.to_string());
        }
    }
    parts.join(".")
}

fn file_scoped_namespace(parsed: &ParsedFile) -> Option<String> {
    let root = parsed.tree.root_node();
    let declaration = child_of_kind(root, "file_scoped_namespace_declaration")?;
    let name = declaration.child_by_field_name("name")?;
    Some(squash(parsed.node_text(name)))
}

fn normalize_using(text: &str) -> String {
    let body = text.trim().trim_end_matches(';').trim();
    let body = body.strip_prefix("global ").map(str::trim_start).unwrap_or(body);
    let body = body.strip_prefix("using").map(str::trim_start).unwrap_or(body);
    squash(body)
}

fn is_task_type(return_type: &str) -> bool {
    let simple = return_type.split('<').next().unwrap_or(return_type);
    let simple = simple.rsplit('.').next().unwrap_or(simple).trim();
    simple == "Task" || simple == "ValueTask"
}

fn child_of_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).find(|c| c.kind() == kind);
    found
}

fn last_child_of_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .filter(|c| c.kind() == kind)
        .last();
    found
}

/// Collapse runs of whitespace (including newlines) into single spaces.
fn squash(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    fn extract(source: &str) -> Vec<StructureDesc> {
        CSharpAnalyzer::new()
            .extract(source, Path::new("Test.cs"), &ExtractOptions::default())
            .unwrap()
    }

    const ORDER_SERVICE: &str = r#"using System;
using System.Threading.Tasks;

namespace Shop.Orders
{
    [Serializable]
    public class OrderService : ServiceBase, IOrderService, IDisposable
    {
        private readonly int _limit;
        public string Name { get; set; }

        public OrderService(int limit)
        {
            _limit = limit;
        }

        public async Task<int> CountAsync(string customer, bool active = true)
        {
            return await Task.FromResult(_limit);
        }

        protected internal static void Reset() { }

        public void Dispose() { }
    }
}
"#;

    #[test]
    fn test_grammar_abi_is_loadable() {
        let language: Language = tree_sitter_c_sharp::LANGUAGE.into();
        let version = language.version();
        assert!(
            (tree_sitter::MIN_COMPATIBLE_LANGUAGE_VERSION..=tree_sitter::LANGUAGE_VERSION)
                .contains(&version),
            "grammar ABI {} not supported by the tree-sitter runtime",
            version
        );
        assert!(CSharpAnalyzer::new().create_parser().is_ok());
    }

    #[test]
    fn test_extract_class_shape() {
        let structures = extract(ORDER_SERVICE);
        assert_eq!(structures.len(), 1);

        let s = &structures[0];
        assert_eq!(s.name, "OrderService");
        assert_eq!(s.kind, StructureKind::Class);
        assert_eq!(s.namespace, "Shop.Orders");
        assert_eq!(s.imports, vec!["System", "System.Threading.Tasks"]);
        assert_eq!(s.base_type, "ServiceBase");
        assert_eq!(s.interfaces, vec!["IOrderService", "IDisposable"]);
        assert_eq!(s.attributes, vec!["[Serializable]"]);
        assert_eq!(s.modifiers, vec!["public"]);
        assert_eq!(s.indent_level, 1);
        assert_eq!(s.methods.len(), 4);
    }

    #[test]
    fn test_extract_methods() {
        let structures = extract(ORDER_SERVICE);
        let s = &structures[0];

        let ctor = s.find_method("OrderService").unwrap();
        assert!(ctor.is_constructor);
        assert_eq!(ctor.return_type, "");
        assert_eq!(ctor.parameters[0].name, "limit");
        assert_eq!(ctor.parameters[0].type_name, "int");

        let count = s.find_method("CountAsync").unwrap();
        assert!(count.is_async);
        assert!(count.is_task);
        assert!(!count.is_constructor);
        assert_eq!(count.return_type, "Task<int>");
        assert_eq!(count.access_modifier, "public");
        assert_eq!(count.indent_level, 2);
        assert_eq!(count.parameters.len(), 2);
        assert_eq!(count.parameters[1].name, "active");
        assert_eq!(count.parameters[1].type_name, "bool");
        assert!(count.parameters[1].has_default);
        assert_eq!(count.parameters[1].default_value.as_deref(), Some("true"));
        assert!(count.body.contains("Task.FromResult"));

        let reset = s.find_method("Reset").unwrap();
        assert_eq!(reset.access_modifier, "protected internal");
        assert!(reset.is_static);
        assert_eq!(reset.return_type, "void");
    }

    #[test]
    fn test_method_offset_is_line_above_declaration() {
        let structures = extract(ORDER_SERVICE);
        let count = structures[0].find_method("CountAsync").unwrap();
        let before = &ORDER_SERVICE[..count.start_offset];
        assert!(before.ends_with("}\n"), "unexpected anchor: {:?}", before);
        assert!(ORDER_SERVICE[count.start_offset..].starts_with("\n        public async"));
    }

    #[test]
    fn test_extract_properties_and_fields() {
        let structures = extract(ORDER_SERVICE);
        let props = &structures[0].properties;
        assert!(props
            .iter()
            .any(|p| p.name == "_limit" && p.type_name == "int" && !p.is_property));
        assert!(props
            .iter()
            .any(|p| p.name == "Name" && p.type_name == "string" && p.is_property));
    }

    #[test]
    fn test_enum_values() {
        let source = r#"
public enum Color { Red, Green = 5, Blue }

public enum Level
{
    A,
    B,
    C = 10,
    D
}

public enum Flags { None = 0x0, All = 0xFF, Neg = -2, Next }
"#;
        let structures = extract(source);
        let values = |name: &str| -> Vec<i64> {
            structures
                .iter()
                .find(|s| s.name == name)
                .unwrap()
                .enum_members
                .as_ref()
                .unwrap()
                .iter()
                .map(|m| m.value)
                .collect()
        };

        assert_eq!(values("Color"), vec![0, 5, 6]);
        assert_eq!(values("Level"), vec![0, 1, 10, 11]);
        assert_eq!(values("Flags"), vec![0, 255, -2, -1]);
    }

    #[test]
    fn test_nested_structure_shift() {
        let source = r#"public class Outer
{
    public class Inner
    {
        public void Run() { }
    }

    public void Stop() { }
}
"#;
        let structures = extract(source);
        assert_eq!(structures.len(), 2);

        let outer = &structures[0];
        let inner = &structures[1];
        assert_eq!(outer.name, "Outer");
        assert_eq!(inner.name, "Inner");
        assert_eq!(inner.indent_level, 1);
        assert_eq!(outer.indent_shift_code, inner.raw_span());
        assert_eq!(outer.end_offset, source.trim_end().len() + inner.raw_span());

        // Members of the nested type stay with it.
        assert!(outer.find_method("Run").is_none());
        assert!(inner.find_method("Run").is_some());
        assert!(outer.find_method("Stop").is_some());
    }

    #[test]
    fn test_region_directive_excluded_from_offset() {
        let source = r#"public class Api
{
    #region Queries
    public int Count() { return 0; }
    #endregion
}
"#;
        let structures = extract(source);
        let count = structures[0].find_method("Count").unwrap();
        assert!(source[..count.start_offset].ends_with("#region Queries"));
    }

    #[test]
    fn test_existing_summary_captured() {
        let source = r#"/// <summary>
/// A widget.
/// </summary>
public class Widget
{
    /// <summary>Spins.</summary>
    public void Spin(int times) { }
}
"#;
        let structures = extract(source);
        assert_eq!(
            structures[0].existing_summary,
            "/// <summary>\n/// A widget.\n/// </summary>"
        );
        assert_eq!(
            structures[0].methods[0].existing_summary,
            "/// <summary>Spins.</summary>"
        );
    }

    #[test]
    fn test_interface_and_record() {
        let source = r#"namespace Shop;

public interface IRepository<T> : IDisposable
{
    T Find(int id);
}

public record Person(string Name, int Age);
"#;
        let structures = extract(source);

        let repo = structures.iter().find(|s| s.name == "IRepository").unwrap();
        assert_eq!(repo.kind, StructureKind::Interface);
        assert_eq!(repo.namespace, "Shop");
        assert_eq!(repo.interfaces, vec!["IDisposable"]);
        let find = repo.find_method("Find").unwrap();
        assert_eq!(find.return_type, "T");
        assert_eq!(find.access_modifier, "");
        assert!(find.body.is_empty());

        let person = structures.iter().find(|s| s.name == "Person").unwrap();
        assert_eq!(person.kind, StructureKind::Record);
        assert_eq!(person.properties.len(), 2);
        assert_eq!(person.properties[1].name, "Age");
        assert_eq!(person.properties[1].type_name, "int");
    }

    #[test]
    fn test_parse_error_yields_no_structures() {
        let result = CSharpAnalyzer::new().extract(
            "public class {\n void\n",
            Path::new("Broken.cs"),
            &ExtractOptions::default(),
        );
        match result {
            Err(PipelineError::Parse { path, .. }) => assert_eq!(path, "Broken.cs"),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_integer_literal() {
        assert_eq!(parse_integer_literal("5"), Some(5));
        assert_eq!(parse_integer_literal("-3"), Some(-3));
        assert_eq!(parse_integer_literal("0x1F"), Some(31));
        assert_eq!(parse_integer_literal("0b101"), Some(5));
        assert_eq!(parse_integer_literal("1_000UL"), Some(1000));
        assert_eq!(parse_integer_literal("A | B"), None);
    }

    #[test]
    fn test_normalize_using() {
        assert_eq!(normalize_using("using System.Linq;"), "System.Linq");
        assert_eq!(normalize_using("global using System;"), "System");
        assert_eq!(normalize_using("using static System.Math;"), "static System.Math");
        assert_eq!(
            normalize_using("using Json = Newtonsoft.Json;"),
            "Json = Newtonsoft.Json"
        );
    }
}
