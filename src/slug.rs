//! Variable-name normalization

/// Convert a raw, human-entered variable name to its canonical form:
/// lowercase alphanumerics with single `_` separators, no leading or
/// trailing separator. Two names with the same normal form refer to the
/// same variable, and normalizing an already normalized name returns it
/// unchanged.
pub fn variable_name_slug(raw: &str) -> String {
    slug::slugify(raw).replace('-', "_")
}
