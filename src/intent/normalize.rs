// src/intent/normalize.rs
//! Input canonicalization shared by every stage of the intent pipeline.

/// Collapse whitespace runs to a single space, trim both ends and lowercase.
///
/// Total and idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_space = false;
    for ch in input.trim().chars() {
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        // Full Unicode lowercase ("İ" may expand to two chars).
        out.extend(ch.to_lowercase());
    }
    out
}
