//! Name derivation shared by every generated artifact.
//!
//! The parameter tree, the dispatch code and the permission list refer to
//! the same controls and globals by name. All of those names are built
//! here and nowhere else.

use tagsynth_interchange::SchemaLocator;

/// Namespace prefix of the per-event tracking functions.
pub const CAPABILITY_NAMESPACE: &str = "__snowtype.";

/// Name of the top-level control selecting the event spec.
pub const EVENT_SPEC_PARAM: &str = "eventSpec";

/// Property slot holding an entity's context generator.
pub const CONTEXT_GENERATOR: &str = "context_generator";

/// Value of the context generator control meaning "fill fields manually".
pub const NO_GENERATOR: &str = "no";

/// Split on whitespace, `_` and `-`, upper-case the first character of
/// each segment, lower-case the rest and concatenate.
///
/// `"add to_cart-v2"` → `"AddToCartV2"`, `"addToCart"` → `"Addtocart"`
pub fn camel_case(text: &str) -> String {
    text.split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|seg| !seg.is_empty())
        .map(|seg| {
            let mut chars = seg.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.as_str().to_lowercase().chars())
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Fully-qualified global invoked for an event spec:
/// `__snowtype.track<Camel(source name)><Camel(event spec name)>`.
pub fn capability_name(source: &SchemaLocator, event_spec_name: &str) -> String {
    format!(
        "{}track{}{}",
        CAPABILITY_NAMESPACE,
        camel_case(source.display_name()),
        camel_case(event_spec_name)
    )
}

/// Flat parameter name `<owner>|<property>`.
pub fn parameter_name(owner: &str, property: &str) -> String {
    format!("{}|{}", owner, property)
}

pub fn entity_group_name(entity: &str) -> String {
    format!("{}_entities", entity)
}

/// JavaScript variable holding an entity's manually built object.
pub fn entity_variable(entity: &str) -> String {
    js_identifier(&format!("{}_context", entity))
}

/// Single-quoted JavaScript string literal.
pub fn js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Coerce `s` into a valid JavaScript identifier.
pub fn js_identifier(s: &str) -> String {
    let mut out: String = s
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}
