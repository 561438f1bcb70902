//! Body cleaning applied during acquisition, before text reaches the index.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ENTITY_RE: Regex = Regex::new(r"&.{2,4};").expect("valid regex");
    static ref PIPE_TEMPLATE_RE: Regex = Regex::new(r"\{\{!\}\}").expect("valid regex");
    static ref TEMPLATE_RE: Regex = Regex::new(r"\{\{.*?\}\}").expect("valid regex");
    static ref TAG_RE: Regex = Regex::new(r"<.*?>").expect("valid regex");
    static ref DISALLOWED_RE: Regex = Regex::new(r"[^a-z0-9çáéíóúàãõâêô-]").expect("valid regex");
}

/// Lower-cases and strips wiki markup: entities and `{{!}}` become spaces,
/// `{{...}}` templates and `<...>` tags are dropped, and anything outside
/// `[a-z0-9çáéíóúàãõâêô-]` becomes a space.
pub fn clean_text(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let text = ENTITY_RE.replace_all(lowered.trim(), " ");
    let text = PIPE_TEMPLATE_RE.replace_all(&text, " ");
    let text = TEMPLATE_RE.replace_all(&text, "");
    let text = TAG_RE.replace_all(&text, "");
    DISALLOWED_RE.replace_all(&text, " ").trim().to_owned()
}

/// Decodes the five predefined XML entities.
pub fn unescape_xml(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
