//! Nested-structure offset reconciliation.
//!
//! Extraction records every type with its raw node range. This pass runs
//! once over the finished list: each structure's end is extended by the
//! spans of all structures lying inside it, and the extension is recorded
//! as `indent_shift_code`. The input is left untouched.

use super::StructureDesc;

/// Apply the containment correction to a finished extraction result.
///
/// Running it again on its own output gives the same result, since spans
/// are measured without any previously applied shift.
pub fn reconcile_nested(structures: &[StructureDesc]) -> Vec<StructureDesc> {
    structures
        .iter()
        .map(|outer| {
            let shift: usize = structures
                .iter()
                .filter(|inner| outer.contains(inner))
                .map(|inner| inner.raw_span())
                .sum();

            StructureDesc {
                end_offset: outer.start_offset + outer.raw_span() + shift,
                indent_shift_code: shift,
                ..outer.clone()
            }
        })
        .collect()
}
