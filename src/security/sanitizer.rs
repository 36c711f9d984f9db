//! Script-injection sanitizer for user-supplied parameter values.
//!
//! # Responsibilities
//! - Remove `<script>`/`<xss>` tag markers
//! - Neutralize strings and patterns that are never allowed (`javascript:`, `document.cookie`, ...)
//! - Strip inline event handlers from tags
//! - Escape brackets of dangerous elements and parens of dangerous calls
//!
//! # Design Decisions
//! - Pure function: `&str -> String`, never fails
//! - Replacement marker is the literal `[removed]`
//! - Passes run in a fixed order; the never-allowed passes run first and last

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Marker inserted in place of removed content.
pub const REMOVED: &str = "[removed]";

const NEVER_ALLOWED_STR: &[(&str, &str)] = &[
    ("document.cookie", REMOVED),
    ("document.write", REMOVED),
    (".parentNode", REMOVED),
    (".innerHTML", REMOVED),
    ("window.location", REMOVED),
    ("-moz-binding", REMOVED),
    ("<!--", "&lt;!--"),
    ("-->", "--&gt;"),
    ("<![CDATA[", "&lt;![CDATA["),
];

static CONTROL_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F]").unwrap());

static NEVER_ALLOWED_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)javascript\s*:",
        r"(?i)vbscript\s*:",
        r"(?i)expression\s*(\(|&#40;)",
        r"(?i)Redirect\s+302",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static SCRIPT_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(/*)(script|xss)(.*?)>").unwrap());

static EVENT_HANDLER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(<[^>]*?[^a-z_\-])on\w*\s*=\s*("[^"]*"|'[^']*'|[^\s>]*)"#).unwrap()
});

static NAUGHTY_ELEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)<(/*\s*)(alert|applet|audio|basefont|base|behavior|bgsound|blink|body|embed|expression|form|frameset|frame|head|html|ilayer|iframe|input|isindex|layer|link|meta|object|plaintext|style|script|textarea|title|video|xml|xss)([^><]*)(>?)",
    )
    .unwrap()
});

static NAUGHTY_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)(alert|cmd|passthru|eval|exec|expression|system|fopen|fsockopen|file|file_get_contents|readfile|unlink)(\s*)\((.*?)\)",
    )
    .unwrap()
});

/// Sanitize a single value.
///
/// ```
/// use mvc_router::security::sanitize;
///
/// assert_eq!(
///     sanitize(r#"<script>alert("foo")</script>"#),
///     r#"[removed]alert&#40;"foo"&#41;[removed]"#,
/// );
/// ```
pub fn sanitize(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let mut out = CONTROL_CHARS.replace_all(input, "").into_owned();
    out = remove_never_allowed(&out);

    out = SCRIPT_TAG.replace_all(&out, REMOVED).into_owned();
    out = strip_event_handlers(&out);

    out = NAUGHTY_ELEMENT
        .replace_all(&out, |caps: &Captures| {
            let close = if caps[4].is_empty() { "" } else { "&gt;" };
            format!("&lt;{}{}{}{}", &caps[1], &caps[2], &caps[3], close)
        })
        .into_owned();

    out = NAUGHTY_CALL
        .replace_all(&out, "$1$2&#40;$3&#41;")
        .into_owned();

    remove_never_allowed(&out)
}

fn remove_never_allowed(input: &str) -> String {
    let mut out = input.to_string();
    for (needle, replacement) in NEVER_ALLOWED_STR {
        if out.contains(needle) {
            out = out.replace(needle, replacement);
        }
    }
    for pattern in NEVER_ALLOWED_PATTERNS.iter() {
        out = pattern.replace_all(&out, REMOVED).into_owned();
    }
    out
}

// Each pass removes one handler per tag, so loop until stable.
fn strip_event_handlers(input: &str) -> String {
    let mut out = input.to_string();
    loop {
        let next = EVENT_HANDLER.replace_all(&out, "$1").into_owned();
        if next == out {
            return out;
        }
        out = next;
    }
}
