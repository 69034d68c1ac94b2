//! PDF Compiler Adapter — shells out to an external compiler against
//! normalized content.
//!
//! Two independent paths:
//! 1. LaTeX → PDF via the LaTeX toolchain (`pdflatex` by default).
//! 2. Markdown → HTML (comrak) → PDF via headless Chrome.
//!
//! Both paths compile inside a scratch directory that is removed on scope
//! exit, success or failure. Neither path raises on compiler failure: the
//! outcome is a logged diagnostic and the absence of the output file. Callers
//! inspect the filesystem to know whether the operation succeeded. No timeout
//! is configured for the subprocess.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::tempdir;
use tracing::{error, info, warn};
use url::Url;
use which::which;

use crate::errors::AppError;

/// Fixed name of the compilation unit inside the scratch directory. The LaTeX
/// toolchain derives the output name from it.
const JOB_NAME: &str = "resume";

/// LaTeX → PDF path.
pub struct LatexCompiler {
    program: String,
}

impl Default for LatexCompiler {
    fn default() -> Self {
        Self::new("pdflatex")
    }
}

impl LatexCompiler {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Compiles `latex` and writes the PDF to `dest`, overwriting any
    /// existing file of that name.
    ///
    /// Compiler failure is terminal but non-fatal: it is logged and the
    /// method returns normally with no artifact produced.
    pub fn compile(&self, latex: &str, class_file: &Path, dest: &Path) {
        if let Err(e) = self.compile_inner(latex, class_file, dest) {
            error!("LaTeX compilation failed: {e}");
        }
    }

    fn compile_inner(&self, latex: &str, class_file: &Path, dest: &Path) -> Result<(), AppError> {
        let scratch = tempdir()?;
        fs::write(scratch.path().join(format!("{JOB_NAME}.tex")), latex)?;

        // The class resource must sit next to the .tex file.
        let class_name = class_file
            .file_name()
            .ok_or_else(|| AppError::Validation(format!(
                "Class file path '{}' has no file name",
                class_file.display()
            )))?;
        fs::copy(class_file, scratch.path().join(class_name))?;

        let output = Command::new(&self.program)
            .arg("-interaction=nonstopmode")
            .arg(format!("{JOB_NAME}.tex"))
            .current_dir(scratch.path())
            .output()
            .map_err(|e| {
                AppError::Compilation(format!("failed to launch '{}': {e}", self.program))
            })?;

        if !output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let tail: String = stdout
                .lines()
                .rev()
                .take(20)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect::<Vec<_>>()
                .join("\n");
            return Err(AppError::Compilation(format!(
                "'{}' exited with {}:\n{tail}",
                self.program, output.status
            )));
        }

        fs::copy(scratch.path().join(format!("{JOB_NAME}.pdf")), dest)?;
        info!("Wrote {}", dest.display());
        Ok(())
    }
}

/// Markdown → HTML → PDF path.
#[derive(Default)]
pub struct MarkdownRenderer {
    chrome: Option<PathBuf>,
}

impl MarkdownRenderer {
    /// Renderer with an explicit browser binary instead of discovery.
    pub fn with_browser(path: impl Into<PathBuf>) -> Self {
        Self {
            chrome: Some(path.into()),
        }
    }

    /// Converts each input to a PDF written alongside it with the extension
    /// replaced. Best-effort sequential pass: missing inputs are skipped with
    /// a warning, individual failures are logged and the loop continues.
    pub fn convert_all(&self, inputs: &[PathBuf]) {
        for input in inputs {
            if !input.exists() {
                warn!("Skipping missing input file {}", input.display());
                continue;
            }
            if let Err(e) = self.convert_one(input) {
                error!("PDF conversion failed for {}: {e}", input.display());
            }
        }
    }

    fn convert_one(&self, input: &Path) -> Result<(), AppError> {
        let markdown = fs::read_to_string(input)?;
        let body = comrak::markdown_to_html(&markdown, &comrak::Options::default());
        let html = wrap_html(&body);

        let scratch = tempdir()?;
        let html_path = scratch.path().join("document.html");
        let pdf_path = scratch.path().join("document.pdf");
        fs::write(&html_path, html)?;

        let file_url = Url::from_file_path(&html_path).map_err(|_| {
            AppError::Compilation("failed to construct file:// URL for HTML input".to_string())
        })?;

        let chrome = match &self.chrome {
            Some(path) => path.clone(),
            None => resolve_chrome_binary()?,
        };

        let status = Command::new(&chrome)
            .arg("--headless")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg(format!("--print-to-pdf={}", pdf_path.display()))
            .arg(file_url.as_str())
            .status()
            .map_err(|e| {
                AppError::Compilation(format!("failed to launch '{}': {e}", chrome.display()))
            })?;

        if !status.success() {
            return Err(AppError::Compilation(format!(
                "'{}' exited with {status}",
                chrome.display()
            )));
        }

        let dest = input.with_extension("pdf");
        fs::copy(&pdf_path, &dest)?;
        info!("Wrote {}", dest.display());
        Ok(())
    }
}

fn wrap_html(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>\n\
         @page {{ size: letter; margin: 18mm; }}\n\
         body {{ font-family: Georgia, serif; line-height: 1.4; }}\n\
         </style>\n</head>\n<body>\n{body}</body>\n</html>\n"
    )
}

fn resolve_chrome_binary() -> Result<PathBuf, AppError> {
    if let Some(path) = env::var_os("TAILOR_CHROME_BIN") {
        if !path.is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    for candidate in [
        "google-chrome",
        "google-chrome-stable",
        "chromium",
        "chromium-browser",
        "chrome",
    ] {
        if let Ok(path) = which(candidate) {
            return Ok(path);
        }
    }

    Err(AppError::Compilation(
        "no Chrome/Chromium binary found; set TAILOR_CHROME_BIN".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_latex_compiler_logs_and_leaves_no_artifact() {
        let scratch = tempfile::tempdir().unwrap();
        let class_file = scratch.path().join("resume.cls");
        fs::write(&class_file, "% class stub").unwrap();
        let dest = scratch.path().join("out.pdf");

        let compiler = LatexCompiler::new("definitely-not-a-latex-binary");
        compiler.compile("\\documentclass{resume}", &class_file, &dest);

        assert!(!dest.exists(), "no artifact may be produced on failure");
    }

    #[test]
    fn test_class_file_without_name_is_rejected() {
        let scratch = tempfile::tempdir().unwrap();
        let dest = scratch.path().join("out.pdf");
        let compiler = LatexCompiler::new("definitely-not-a-latex-binary");
        // Path ending in `..` has no file name; compile must not panic.
        compiler.compile("x", Path::new(".."), &dest);
        assert!(!dest.exists());
    }

    #[test]
    fn test_convert_all_skips_missing_inputs() {
        let renderer = MarkdownRenderer::with_browser("definitely-not-a-browser");
        // Must not error or panic; the loop is best-effort.
        renderer.convert_all(&[PathBuf::from("/nonexistent/report.md")]);
    }

    #[test]
    fn test_convert_all_continues_past_individual_failure() {
        let scratch = tempfile::tempdir().unwrap();
        let first = scratch.path().join("first.md");
        let second = scratch.path().join("second.md");
        fs::write(&first, "# First").unwrap();
        fs::write(&second, "# Second").unwrap();

        let renderer = MarkdownRenderer::with_browser("definitely-not-a-browser");
        renderer.convert_all(&[first.clone(), second.clone()]);

        assert!(!first.with_extension("pdf").exists());
        assert!(!second.with_extension("pdf").exists());
    }

    #[test]
    fn test_wrap_html_embeds_body_and_page_rules() {
        let html = wrap_html("<h1>Resume</h1>");
        assert!(html.contains("<h1>Resume</h1>"));
        assert!(html.contains("@page"));
    }

    #[test]
    fn test_output_is_written_alongside_input() {
        let input = PathBuf::from("/tmp/some/cover_letter.md");
        assert_eq!(
            input.with_extension("pdf"),
            PathBuf::from("/tmp/some/cover_letter.pdf")
        );
    }
}
