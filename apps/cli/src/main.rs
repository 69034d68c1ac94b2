mod config;
mod errors;
mod llm;
mod pipeline;
mod render;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm::ProviderRegistry;
use crate::pipeline::{Pipeline, PipelineInputs};
use crate::render::{LatexCompiler, MarkdownRenderer};

/// Markdown report written after the formatting stage. Overwritten on every
/// run — no versioning.
const RESUME_REPORT_FILE: &str = "latex_resume.md";
const COVER_LETTER_FILE: &str = "cover_letter.md";

#[derive(Parser)]
#[command(
    name = "tailor",
    version,
    about = "Tailors a resume and cover letter to a job posting and renders them to PDF"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full tailoring pipeline against a job posting
    Run {
        /// Path to the source ("super") resume
        #[arg(long)]
        resume: PathBuf,
        /// Path to the JSON configuration file
        #[arg(long)]
        config: PathBuf,
        /// LaTeX class resource compiled alongside the resume
        #[arg(long, default_value = "resume.cls")]
        class_file: PathBuf,
        /// Name of the PDF written to the working directory
        #[arg(long, default_value = "tailored_resume.pdf")]
        output: PathBuf,
        /// Write the Markdown artifacts but skip PDF compilation
        #[arg(long)]
        skip_pdf: bool,
    },
    /// Render an existing generated Markdown document to PDF (no LLM calls)
    Render {
        /// Generated document containing a fenced `latex` block
        #[arg(long, default_value = RESUME_REPORT_FILE)]
        input: PathBuf,
        #[arg(long, default_value = "resume.cls")]
        class_file: PathBuf,
        #[arg(long, default_value = "tailored_resume.pdf")]
        output: PathBuf,
        /// Optional config, consulted for the canonical preamble
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Convert Markdown documents to PDF, written alongside each input
    Convert {
        /// Input files; missing ones are skipped with a warning
        inputs: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("{}=info", env!("CARGO_PKG_NAME")))),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("tailor v{}", env!("CARGO_PKG_VERSION"));

    match Cli::parse().command {
        Command::Run {
            resume,
            config,
            class_file,
            output,
            skip_pdf,
        } => run_pipeline(&resume, &config, &class_file, &output, skip_pdf).await,
        Command::Render {
            input,
            class_file,
            output,
            config,
        } => {
            let preamble = match config {
                Some(path) => Config::load(&path)?.canonical_preamble,
                None => None,
            };
            let document = std::fs::read_to_string(&input)
                .with_context(|| format!("Failed to read '{}'", input.display()))?;
            render_to_pdf(&document, preamble.as_deref(), &class_file, &output)
        }
        Command::Convert { inputs } => {
            MarkdownRenderer::default().convert_all(&inputs);
            Ok(())
        }
    }
}

async fn run_pipeline(
    resume: &Path,
    config: &Path,
    class_file: &Path,
    output: &Path,
    skip_pdf: bool,
) -> Result<()> {
    let config = Config::load(config)?;
    config.log_llm_assignments();

    let registry = ProviderRegistry::builtin();
    let pipeline = Pipeline::from_config(&config, &registry)?;

    let resume_text = std::fs::read_to_string(resume)
        .with_context(|| format!("Failed to read resume '{}'", resume.display()))?;
    let inputs = PipelineInputs::from_config(&config, resume_text);

    let outputs = pipeline.run(&inputs).await?;

    std::fs::write(RESUME_REPORT_FILE, &outputs.resume_report)?;
    std::fs::write(COVER_LETTER_FILE, &outputs.cover_letter)?;
    info!("Wrote {RESUME_REPORT_FILE} and {COVER_LETTER_FILE}");

    if skip_pdf {
        return Ok(());
    }
    render_to_pdf(
        &outputs.resume_report,
        config.canonical_preamble.as_deref(),
        class_file,
        output,
    )
}

/// The PDF path: extract the fenced block, normalize its bracket syntax,
/// optionally canonicalize the preamble, compile.
fn render_to_pdf(
    document: &str,
    canonical_preamble: Option<&str>,
    class_file: &Path,
    output: &Path,
) -> Result<()> {
    let block = render::extract_fenced(document, "latex")?;
    let mut normalized = render::normalize(&block);
    if let Some(preamble) = canonical_preamble {
        normalized = render::canonicalize_preamble(&normalized, preamble, render::PREAMBLE_ANCHOR);
    }
    LatexCompiler::default().compile(&normalized, class_file, output);
    Ok(())
}
