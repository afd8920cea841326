//! Identifier casing helpers shared by the coercer and the classifier.

/// Convert a `snake_case` identifier to `PascalCase`.
///
/// Empty segments are dropped, so leading, trailing and doubled underscores
/// collapse silently.
pub fn to_pascal_case(identifier: &str) -> String {
    identifier
        .split('_')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// First non-empty underscore-delimited token of an identifier
pub fn first_token(identifier: &str) -> &str {
    identifier
        .split('_')
        .find(|segment| !segment.is_empty())
        .unwrap_or("")
}

/// All non-empty underscore-delimited tokens of an identifier
pub fn tokens(identifier: &str) -> impl Iterator<Item = &str> {
    identifier.split('_').filter(|segment| !segment.is_empty())
}
