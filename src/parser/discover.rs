//! Placeholder discovery

use std::collections::BTreeSet;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

/// Lexical form of a variable placeholder: `${ name }` with optional spaces
/// inside the braces and a name drawn from `[a-zA-Z0-9_]`. Anything else
/// between `${` and `}` is not a placeholder and stays literal text.
pub(crate) static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{[ ]*([a-zA-Z0-9_]+)[ ]*\}").expect("placeholder pattern is valid")
});

/// Extract the distinct variable names referenced by `source`, sorted
/// lexicographically.
///
/// The whole multi-line string is scanned, comment lines included. Names
/// are reported exactly as written; normalization is the registry's
/// concern, so `${Var}` and `${var}` are two discovered names.
pub fn discover_variables(source: &str) -> Vec<String> {
    let mut names = BTreeSet::new();
    for captures in PLACEHOLDER.captures_iter(source) {
        if let Some(name) = captures.get(1) {
            debug!("found variable {}", name.as_str());
            names.insert(name.as_str().to_string());
        }
    }
    names.into_iter().collect()
}
