//! Variable name helpers.

/// Strip everything but ASCII letters and digits.
///
/// `"OSD.Start Time"` becomes `"OSDStartTime"`. The result may be empty.
pub fn sanitize_name(name: &str) -> String {
    name.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// Strip `prefix` from the start of `name`, ignoring ASCII case.
///
/// Returns `None` when `name` does not start with `prefix`.
pub fn strip_prefix_ignore_case<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    let head = name.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&name[prefix.len()..])
    } else {
        None
    }
}

/// Order names case-insensitively, falling back to ordinal order on ties.
pub fn sort_names(names: &mut Vec<String>) {
    names.sort_by(|a, b| {
        a.to_ascii_lowercase()
            .cmp(&b.to_ascii_lowercase())
            .then_with(|| a.cmp(b))
    });
    names.dedup();
}
