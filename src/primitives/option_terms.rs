//! Splitting option-flag descriptions into highlightable tokens

/// The flag at the start of `token`, without trailing argument syntax
///
/// `--color[=WHEN]` yields `--color`; a token that is only dashes yields
/// nothing.
fn leading_flag(token: &str) -> Option<&str> {
    let dashes = if token.starts_with("--") {
        2
    } else if token.starts_with('-') {
        1
    } else {
        return None;
    };
    let name = &token[dashes..];
    if !name.chars().next().is_some_and(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    let name_len = name
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
        .unwrap_or(name.len());
    Some(&token[..dashes + name_len])
}

/// Split a flag list such as `"-r, --recursive FILE"` into unique flags
///
/// Tokens are separated by commas and whitespace; tokens that don't start
/// with a dash are dropped. Order of first appearance is kept.
pub fn parse_option_terms(flags: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for token in flags.split(|c: char| c == ',' || c.is_whitespace()) {
        let Some(flag) = leading_flag(token) else {
            continue;
        };
        if !terms.iter().any(|t| t == flag) {
            terms.push(flag.to_string());
        }
    }
    terms
}
