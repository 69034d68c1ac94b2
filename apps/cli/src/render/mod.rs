//! Templated-document post-processing and rendering.
//!
//! Flow: rendered bracket-syntax markup is embedded in a Markdown report →
//! `extract` isolates the fenced block → `normalize` rewrites bracket syntax
//! to braces → `pdf` compiles it in a scratch directory and copies the
//! artifact out.

pub mod extract;
pub mod normalize;
pub mod pdf;
pub mod template;

pub use extract::extract_fenced;
pub use normalize::{canonicalize_preamble, normalize, PREAMBLE_ANCHOR};
pub use pdf::{LatexCompiler, MarkdownRenderer};
pub use template::render;
