//! Merge of the two extraction passes of one file.
//!
//! The stripped pass (no `///` lines) supplies the offsets; the retained pass
//! (original text) supplies whatever documentation already existed. Types
//! are paired by bare name, methods by [`MethodKey`].

use std::collections::HashMap;

use crate::analysis::{MethodDesc, MethodKey, StructureDesc};

/// Carry existing summaries from `retained` onto a copy of `stripped`.
///
/// Neither input is modified. Methods and structures with no counterpart
/// in the retained pass come out with an empty `existing_summary`.
pub fn merge(stripped: &[StructureDesc], retained: &[StructureDesc]) -> Vec<StructureDesc> {
    let by_name = index_by_name(retained);

    stripped
        .iter()
        .map(|structure| match by_name.get(structure.name.as_str()) {
            Some(previous) => merge_structure(structure, previous),
            None => StructureDesc {
                existing_summary: String::new(),
                methods: structure
                    .methods
                    .iter()
                    .map(|m| MethodDesc {
                        existing_summary: String::new(),
                        ..m.clone()
                    })
                    .collect(),
                ..structure.clone()
            },
        })
        .collect()
}

fn merge_structure(current: &StructureDesc, previous: &StructureDesc) -> StructureDesc {
    let mut summaries: HashMap<MethodKey, &str> = HashMap::new();
    for method in &previous.methods {
        let key = method.key();
        if summaries.contains_key(&key) {
            log::warn!(
                "{}: duplicate method {} in {}, keeping the first",
                previous.file_path,
                method.signature(),
                previous.name
            );
            continue;
        }
        summaries.insert(key, method.existing_summary.as_str());
    }

    let methods = current
        .methods
        .iter()
        .map(|method| MethodDesc {
            existing_summary: summaries
                .get(&method.key())
                .map(|s| s.to_string())
                .unwrap_or_default(),
            ..method.clone()
        })
        .collect();

    StructureDesc {
        existing_summary: previous.existing_summary.clone(),
        methods,
        ..current.clone()
    }
}

fn index_by_name(structures: &[StructureDesc]) -> HashMap<&str, &StructureDesc> {
    let mut index: HashMap<&str, &StructureDesc> = HashMap::new();
    for structure in structures {
        if index.contains_key(structure.name.as_str()) {
            log::warn!(
                "{}: more than one type named {}, matching against the first",
                structure.file_path,
                structure.name
            );
            continue;
        }
        index.insert(structure.name.as_str(), structure);
    }
    index
}
