use memchr::memmem;
use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const TOKEN_PREFIX: &str = "RMGC";
pub const TOKEN_COUNT: usize = 20;

/// Token name to replacement text.
pub type SubstitutionValues = HashMap<String, String>;

/// `RMGC1` .. `RMGC20`, in processing order.
pub static TOKENS: Lazy<Vec<String>> = Lazy::new(|| {
    (1..=TOKEN_COUNT)
        .map(|n| format!("{}{}", TOKEN_PREFIX, n))
        .collect()
});

/// Replaces every token occurrence in `content` and returns the rewritten
/// bytes with the number of occurrences replaced.
///
/// Tokens are ASCII, so matching works on raw bytes and content that is not
/// valid UTF-8 passes through unchanged around the tokens.
///
/// Tokens are applied one after another over the already rewritten content,
/// so a value that contains a later token's name is itself rewritten, and
/// `RMGC1` also matches the first five characters of `RMGC10`..`RMGC19`.
/// Callers rely on this exact ordering.
pub fn substitute(content: &[u8], values: &SubstitutionValues) -> (Vec<u8>, usize) {
    let mut content = content.to_vec();
    let mut replaced = 0;

    for token in TOKENS.iter() {
        let value = values.get(token).map(String::as_bytes).unwrap_or_default();
        let (rewritten, hits) = replace_all(&content, token.as_bytes(), value);
        if hits > 0 {
            content = rewritten;
            replaced += hits;
        }
    }

    (content, replaced)
}

fn replace_all(content: &[u8], token: &[u8], value: &[u8]) -> (Vec<u8>, usize) {
    let positions: Vec<usize> = memmem::find_iter(content, token).collect();
    if positions.is_empty() {
        return (Vec::new(), 0);
    }

    let mut out = Vec::with_capacity(content.len());
    let mut last = 0;
    for at in &positions {
        out.extend_from_slice(&content[last..*at]);
        out.extend_from_slice(value);
        last = at + token.len();
    }
    out.extend_from_slice(&content[last..]);

    (out, positions.len())
}
