//! Pipeline — orchestrates the four tailoring stages.
//!
//! Flow: acquire posting → job analysis → relevance selection →
//!       LaTeX formatting (template render) → cover letter.
//!
//! Stages run strictly in sequence, each hand-off feeding the next. Every
//! stage may use a different provider/model per the `agent_llms` mapping.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::config::Config;
use crate::errors::AppError;
use crate::llm::{complete_json, ChatClient, ProviderRegistry};
use crate::render;

pub mod prompts;

use self::prompts::{
    ANALYSIS_PROMPT_TEMPLATE, ANALYSIS_SYSTEM, COVER_LETTER_PROMPT_TEMPLATE, COVER_LETTER_SYSTEM,
    FORMATTING_PROMPT_TEMPLATE, FORMATTING_SYSTEM, RELEVANCE_PROMPT_TEMPLATE, RELEVANCE_SYSTEM,
    RESUME_TEMPLATE,
};

/// Structured output of the job analysis stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobAnalysis {
    pub skills: Vec<String>,
    pub qualifications: Vec<String>,
    pub experiences: Vec<String>,
    pub summary: String,
}

/// Inputs to a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineInputs {
    pub job_posting_url: Option<String>,
    pub job_description: Option<String>,
    /// Full text of the source ("super") resume.
    pub resume: String,
}

impl PipelineInputs {
    pub fn from_config(config: &Config, resume: String) -> Self {
        Self {
            job_posting_url: config.job_posting_url.clone(),
            job_description: config.job_description.clone(),
            resume,
        }
    }
}

/// Outputs of a pipeline run. `resume_report` is a Markdown document with the
/// rendered bracket-syntax markup embedded as a fenced `latex` block.
#[derive(Debug, Clone)]
pub struct PipelineOutputs {
    pub analysis: JobAnalysis,
    pub tailored_resume: String,
    pub resume_report: String,
    pub cover_letter: String,
}

pub struct Pipeline {
    job_analyzer: Arc<dyn ChatClient>,
    relevance_selector: Arc<dyn ChatClient>,
    formatting_strategist: Arc<dyn ChatClient>,
    cover_letter_writer: Arc<dyn ChatClient>,
    http: reqwest::Client,
}

impl Pipeline {
    pub fn new(
        job_analyzer: Arc<dyn ChatClient>,
        relevance_selector: Arc<dyn ChatClient>,
        formatting_strategist: Arc<dyn ChatClient>,
        cover_letter_writer: Arc<dyn ChatClient>,
    ) -> Self {
        Self {
            job_analyzer,
            relevance_selector,
            formatting_strategist,
            cover_letter_writer,
            http: reqwest::Client::new(),
        }
    }

    /// Builds one client per stage from the configured provider/model
    /// assignments.
    pub fn from_config(config: &Config, registry: &ProviderRegistry) -> Result<Self, AppError> {
        let mut clients = Vec::with_capacity(crate::config::STAGES.len());
        for stage in crate::config::STAGES {
            let spec = config.stage_model(stage);
            let api_key = config.api_key(&spec.service)?;
            clients.push(registry.build(&spec, api_key)?);
        }
        let mut clients = clients.into_iter();
        Ok(Self::new(
            clients.next().expect("four stage clients"),
            clients.next().expect("four stage clients"),
            clients.next().expect("four stage clients"),
            clients.next().expect("four stage clients"),
        ))
    }

    /// Runs all four stages in order and returns the generated documents.
    pub async fn run(&self, inputs: &PipelineInputs) -> Result<PipelineOutputs, AppError> {
        let posting = self.acquire_posting(inputs).await?;

        // Stage 1: job analysis
        info!("Analyzing job posting ({} chars)", posting.len());
        let prompt = ANALYSIS_PROMPT_TEMPLATE.replace("{job_posting}", &posting);
        let analysis: JobAnalysis =
            complete_json(self.job_analyzer.as_ref(), ANALYSIS_SYSTEM, &prompt)
                .await
                .map_err(|e| AppError::Llm(format!("Job analysis failed: {e}")))?;
        info!(
            "Job analysis: {} skills, {} qualifications",
            analysis.skills.len(),
            analysis.qualifications.len()
        );

        // Stage 2: relevance selection
        let analysis_json = serde_json::to_string_pretty(&analysis)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize analysis: {e}")))?;
        let prompt = RELEVANCE_PROMPT_TEMPLATE
            .replace("{analysis}", &analysis_json)
            .replace("{resume}", &inputs.resume);
        let tailored_resume = self
            .relevance_selector
            .complete(RELEVANCE_SYSTEM, &prompt)
            .await
            .map_err(|e| AppError::Llm(format!("Relevance selection failed: {e}")))?;
        info!("Tailored resume drafted ({} chars)", tailored_resume.len());

        // Stage 3: formatting — field extraction, then template render
        let prompt = FORMATTING_PROMPT_TEMPLATE.replace("{tailored_resume}", &tailored_resume);
        let fields: Map<String, Value> =
            complete_json(self.formatting_strategist.as_ref(), FORMATTING_SYSTEM, &prompt)
                .await
                .map_err(|e| AppError::Llm(format!("Formatting stage failed: {e}")))?;
        let rendered = render::render(RESUME_TEMPLATE, &fields)?;
        let resume_report = build_resume_report(&rendered);
        info!("Resume markup rendered ({} chars)", rendered.len());

        // Stage 4: cover letter
        let prompt = COVER_LETTER_PROMPT_TEMPLATE
            .replace("{analysis}", &analysis_json)
            .replace("{tailored_resume}", &tailored_resume);
        let cover_letter = self
            .cover_letter_writer
            .complete(COVER_LETTER_SYSTEM, &prompt)
            .await
            .map_err(|e| AppError::Llm(format!("Cover letter stage failed: {e}")))?;
        info!("Cover letter drafted ({} chars)", cover_letter.len());

        Ok(PipelineOutputs {
            analysis,
            tailored_resume,
            resume_report,
            cover_letter,
        })
    }

    /// Fetches the job posting URL; on any fetch failure falls back to the
    /// raw description supplied in configuration.
    async fn acquire_posting(&self, inputs: &PipelineInputs) -> Result<String, AppError> {
        if let Some(url) = &inputs.job_posting_url {
            match self.fetch_posting(url).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    warn!("Could not fetch job posting from {url}: {e} — falling back to raw description");
                }
            }
        }

        inputs
            .job_description
            .clone()
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| {
                AppError::Validation(
                    "No job posting available: set job_posting_url or job_description".to_string(),
                )
            })
    }

    async fn fetch_posting(&self, url: &str) -> Result<String, reqwest::Error> {
        let response = self.http.get(url).send().await?.error_for_status()?;
        response.text().await
    }
}

/// Wraps the rendered markup in the Markdown report written to disk. The
/// fenced block is what the PDF path later extracts.
fn build_resume_report(rendered: &str) -> String {
    format!(
        "# Tailored Resume\n\nGenerated resume markup. Compile the block below \
         with the resume class file available.\n\n```latex\n{rendered}\n```\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;
    use async_trait::async_trait;

    /// ChatClient that returns a fixed response regardless of prompt.
    struct CannedChat(&'static str);

    #[async_trait]
    impl ChatClient for CannedChat {
        async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
    }

    const ANALYSIS_JSON: &str = r#"{
        "skills": ["Rust", "LLM fine-tuning"],
        "qualifications": ["1+ research project in ML"],
        "experiences": ["Built ML tooling"],
        "summary": "Research scientist role at an edge-AI startup."
    }"#;

    const FIELDS_JSON: &str = r#"{
        "full_name": "Ada Lovelace",
        "email": "ada@example.com",
        "linkedin_profile": "ada-lovelace",
        "phone": "+1 555 0100",
        "city": "London",
        "state": "UK",
        "education": [
            {"degree": "BS", "major": "Mathematics", "university": "Analytical U",
             "start_date": "1835", "end_date": "1839", "courses": "Calculus, Logic"}
        ],
        "skill_category": [
            {"skill_category": "Languages", "skills": "Rust, Python"}
        ],
        "job": [
            {"job_title": "Engineer", "company_website": "https://example.com",
             "company_name": "Engine Co", "city": "London", "state": "UK",
             "start_date": "1840", "end_date": "1842",
             "achievement": [{"achievement": "Wrote the first program"}]}
        ],
        "project": [
            {"project_name": "Notes", "description": [{"description": "Annotated the engine"}]}
        ]
    }"#;

    fn canned_pipeline() -> Pipeline {
        Pipeline::new(
            Arc::new(CannedChat(ANALYSIS_JSON)),
            Arc::new(CannedChat("## Tailored resume\n- **Rust** work")),
            Arc::new(CannedChat(FIELDS_JSON)),
            Arc::new(CannedChat("Dear Hiring Manager,\n\nI am excited to apply.")),
        )
    }

    fn inputs() -> PipelineInputs {
        PipelineInputs {
            job_posting_url: None,
            job_description: Some("AI Research Scientist at a Series A startup.".to_string()),
            resume: "# Ada Lovelace\nMathematician and programmer.".to_string(),
        }
    }

    #[tokio::test]
    async fn test_run_sequences_all_four_stages() {
        let outputs = canned_pipeline().run(&inputs()).await.unwrap();
        assert_eq!(outputs.analysis.skills, vec!["Rust", "LLM fine-tuning"]);
        assert!(outputs.tailored_resume.contains("**Rust**"));
        assert!(outputs.cover_letter.starts_with("Dear Hiring Manager"));
    }

    #[tokio::test]
    async fn test_report_embeds_rendered_markup_as_fenced_block() {
        let outputs = canned_pipeline().run(&inputs()).await.unwrap();
        let block = render::extract_fenced(&outputs.resume_report, "latex").unwrap();
        assert!(block.contains("Ada Lovelace"));
        assert!(block.contains(r"\begin[rSection]EXPERIENCE"));
        // Repeatable markers were consumed by the renderer.
        assert!(!block.contains("[[job_start]]"));
    }

    #[tokio::test]
    async fn test_rendered_block_normalizes_to_brace_syntax() {
        let outputs = canned_pipeline().run(&inputs()).await.unwrap();
        let block = render::extract_fenced(&outputs.resume_report, "latex").unwrap();
        let normalized = render::normalize(&block);
        assert!(normalized.contains(r"\begin{document}"));
        assert!(normalized.contains(r"\begin{rSection}Education"));
        assert!(!normalized.contains(r"\begin["));
    }

    #[tokio::test]
    async fn test_missing_posting_is_a_validation_error() {
        let pipeline = canned_pipeline();
        let inputs = PipelineInputs {
            job_posting_url: None,
            job_description: None,
            resume: String::new(),
        };
        assert!(matches!(
            pipeline.run(&inputs).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_incomplete_field_values_abort_with_missing_field() {
        let pipeline = Pipeline::new(
            Arc::new(CannedChat(ANALYSIS_JSON)),
            Arc::new(CannedChat("tailored")),
            // No `project` key — the template references it.
            Arc::new(CannedChat(
                r#"{"full_name": "Ada", "email": "a@b.c", "linkedin_profile": "ada",
                    "phone": "1", "city": "L", "state": "UK",
                    "education": [], "skill_category": [], "job": []}"#,
            )),
            Arc::new(CannedChat("letter")),
        );
        match pipeline.run(&inputs()).await {
            Err(AppError::MissingField(key)) => assert_eq!(key, "project"),
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn test_analysis_schema_round_trips() {
        let analysis: JobAnalysis = serde_json::from_str(ANALYSIS_JSON).unwrap();
        assert_eq!(analysis.qualifications.len(), 1);
        let json = serde_json::to_string(&analysis).unwrap();
        let again: JobAnalysis = serde_json::from_str(&json).unwrap();
        assert_eq!(again.summary, analysis.summary);
    }
}
