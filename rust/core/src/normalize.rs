// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Response normalization
//!
//! Model output usually wraps the JSON payload in markdown fences and a
//! sentence or two of prose. This strips all of that and leaves the span
//! that the JSON parser should see. It never fails; text that still does
//! not parse is reported by the caller.

const FENCE: &str = "```";

/// Extract the JSON payload from free-form model output.
///
/// 1. Remove every code fence marker together with its language tag
/// 2. Trim surrounding whitespace
/// 3. Keep the span from the first `{` to the last `}` inclusive
///
/// Text without a usable brace span is returned trimmed but otherwise
/// unchanged.
pub fn normalize_response(raw: &str) -> String {
    let stripped = strip_code_fences(raw);
    let trimmed = stripped.trim();

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(first), Some(last)) if first < last => trimmed[first..=last].to_string(),
        _ => trimmed.to_string(),
    }
}

/// Remove ```` ``` ```` markers and any language tag glued to them
fn strip_code_fences(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(pos) = rest.find(FENCE) {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + FENCE.len()..];
        let tag_len = rest
            .find(|c: char| !is_tag_char(c))
            .unwrap_or(rest.len());
        rest = &rest[tag_len..];
    }
    out.push_str(rest);
    out
}

fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-')
}
