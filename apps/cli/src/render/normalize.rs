//! Markup Normalizer — rewrites the template's bracket-delimited macro syntax
//! into LaTeX brace syntax and strips any leftover repeatable-section markers.
//!
//! The closing bracket is NOT matched by depth: after `\word[` becomes
//! `\word{`, every remaining `]` in the document is rewritten to `}`. This is
//! only correct when macro arguments never nest and no literal `]` appears in
//! body text — it is kept as-is for compatibility with documents produced
//! against the bracket-syntax template. A literal `]` in body text WILL be
//! corrupted.

use std::sync::OnceLock;

use regex::Regex;

/// Anchor token separating the preamble from the document body in the
/// generated resume markup.
pub const PREAMBLE_ANCHOR: &str = r"\name";

fn marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[\[.*?\]\]").unwrap())
}

fn macro_open_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\\[A-Za-z]+)\[").unwrap())
}

/// Normalizes rendered bracket-syntax markup for the LaTeX compiler.
///
/// Passes, in order: strip `[[...]]` markers (defensive — the renderer has
/// already consumed them), rewrite `\word[` to `\word{`, rewrite every
/// remaining `]` to `}`.
pub fn normalize(text: &str) -> String {
    let stripped = marker_re().replace_all(text, "");
    let braced = macro_open_re().replace_all(&stripped, "${1}{");
    braced.replace(']', "}")
}

/// Replaces everything before the first occurrence of `anchor` with the
/// canonical preamble. Returns the text unchanged when the anchor is absent.
pub fn canonicalize_preamble(text: &str, preamble: &str, anchor: &str) -> String {
    match text.find(anchor) {
        Some(pos) => format!("{preamble}{}", &text[pos..]),
        None => text.to_string(),
    }
}
