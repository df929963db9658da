//! Base-class versus interface classification of an inheritance list.
//!
//! There is no type binding here: the split is decided by the `I` + uppercase
//! naming convention alone. A base class whose name happens to follow that
//! convention (`class Foo : IdentityBase`) is fine, but one literally named
//! like an interface (`class Foo : IOBase`) is reported as an interface.
//! Callers that can resolve symbols should replace this function rather than
//! patch around it.

/// Result of splitting an inheritance list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inheritance {
    /// Empty when no base class was recognised.
    pub base_type: String,
    pub interfaces: Vec<String>,
}

/// Whether a type name follows the interface naming convention.
///
/// Namespace qualifiers and generic arguments are ignored:
/// `System.IDisposable` and `IEnumerable<T>` both qualify.
pub fn looks_like_interface(name: &str) -> bool {
    let simple = name.split('<').next().unwrap_or(name);
    let simple = simple.rsplit('.').next().unwrap_or(simple).trim();
    let mut chars = simple.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some('I'), Some(second)) if second.is_uppercase()
    )
}

/// Split an inheritance list into base type and interfaces.
///
/// The first entry is the base type unless it looks like an interface, in
/// which case every entry is treated as an interface.
pub fn classify_inheritance(entries: &[String]) -> Inheritance {
    match entries.split_first() {
        None => Inheritance::default(),
        Some((first, rest)) if !looks_like_interface(first) => Inheritance {
            base_type: first.clone(),
            interfaces: rest.to_vec(),
        },
        Some(_) => Inheritance {
            base_type: String::new(),
            interfaces: entries.to_vec(),
        },
    }
}
