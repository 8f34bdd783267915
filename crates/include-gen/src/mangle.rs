//! Symbol-name derivation for the generated macros.

/// Extract the basename part of a complete file path.
///
/// A `\` separator is only consulted when the path contains no `/`, matching
/// the historical generator.
pub fn basename(path: &str) -> &str {
    match path.rfind('/') {
        Some(pos) => &path[pos + 1..],
        None => match path.rfind('\\') {
            Some(pos) => &path[pos + 1..],
            None => path,
        },
    }
}

/// Mangle a file's basename into an identifier usable in a macro name.
///
/// The mapping is byte-wise: ASCII alphanumerics are uppercased and every
/// other byte becomes `_`, so the result has the same length as the input.
pub fn mangle(name: &str) -> String {
    name.bytes()
        .map(|b| {
            if b.is_ascii_alphanumeric() {
                b.to_ascii_uppercase() as char
            } else {
                '_'
            }
        })
        .collect()
}
