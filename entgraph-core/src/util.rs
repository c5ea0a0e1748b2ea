use convert_case::{Case, Casing};

/// Writes `values` into `out` separated by `separator`.
pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v);
    }
}

/// Lowercase snake form of an entity, field or edge name.
pub fn snake(value: &str) -> String {
    value.to_case(Case::Snake)
}

/// Table name derived from an entity name: snake case, pluralized
/// (`Pet` -> `pets`, `Category` -> `categories`).
pub fn pluralize(value: &str) -> String {
    let value = snake(value);
    if let Some(stem) = value.strip_suffix('y') {
        if !stem.is_empty() && !stem.ends_with(['a', 'e', 'i', 'o', 'u']) {
            return format!("{stem}ies");
        }
    }
    if value.ends_with(['s', 'x', 'z']) || value.ends_with("ch") || value.ends_with("sh") {
        return format!("{value}es");
    }
    format!("{value}s")
}

/// Singular role name used for self-referential join-table key columns
/// (`friends` -> `friend`).
pub fn singularize(value: &str) -> String {
    if let Some(stem) = value.strip_suffix("ies") {
        return format!("{stem}y");
    }
    if let Some(stem) = value.strip_suffix("es") {
        if stem.ends_with(['x', 'z']) || stem.ends_with("ch") || stem.ends_with("sh") {
            return stem.to_owned();
        }
    }
    if let Some(stem) = value.strip_suffix('s') {
        if !stem.is_empty() && !stem.ends_with('s') {
            return stem.to_owned();
        }
    }
    value.to_owned()
}
