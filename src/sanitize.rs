//! Identifier sanitization for generated QML names.
//!
//! Every user-supplied name that ends up as an `id`, an `objectName` literal
//! or a file/directory key passes through [`sanitize`].

/// Letter used when a name carries no alphabetic character.
pub const PLACEHOLDER: char = 'a';

/// Turn an arbitrary name into a valid identifier.
///
/// Non-alphanumeric ASCII is dropped, a name without letters gets its first
/// character replaced by [`PLACEHOLDER`], and leading digits are rotated to
/// the end. The result is never empty and always starts with a letter.
pub fn sanitize(raw: &str) -> String {
    let mut cleaned: String = raw.chars().filter(|c| c.is_ascii_alphanumeric()).collect();

    if !cleaned.chars().any(|c| c.is_ascii_alphabetic()) {
        if cleaned.is_empty() {
            return PLACEHOLDER.to_string();
        }
        cleaned.replace_range(0..1, &PLACEHOLDER.to_string());
    }

    let digits = cleaned.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let (leading, rest) = cleaned.split_at(digits);
        return format!("{rest}{leading}");
    }
    cleaned
}

/// Lowercase the first character; QML object ids cannot start uppercase.
pub fn lower_first(ident: &str) -> String {
    let mut chars = ident.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
