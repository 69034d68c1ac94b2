// All LLM prompt constants for the pipeline stages, plus the bracket-syntax
// resume template the formatting stage fills.

/// System prompt for job analysis — enforces JSON-only output.
pub const ANALYSIS_SYSTEM: &str =
    "You are a tech job researcher and analyzer. Your prowess in navigating and \
    extracting critical information from job postings is unmatched. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Job analysis prompt template. Replace `{job_posting}` before sending.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the following job posting and extract the key skills, experiences, and qualifications required. Identify and categorize the requirements.

Return a JSON object with this EXACT schema (no extra fields):
{
  "skills": ["Rust", "distributed systems"],
  "qualifications": ["BS in Computer Science or equivalent"],
  "experiences": ["5+ years building backend services"],
  "summary": "One-paragraph summary of the role and what the employer values most."
}

JOB POSTING:
{job_posting}"#;

/// System prompt for relevance selection.
pub const RELEVANCE_SYSTEM: &str =
    "You are a relevance selector. You excel at matching resume content to job \
    requirements, finding not just keyword matches but conceptually relevant \
    experiences and skills. Stay true to the original resume and do not hallucinate.";

/// Relevance prompt template. Replace `{resume}` and `{analysis}`.
pub const RELEVANCE_PROMPT_TEMPLATE: &str = r#"Identify the most relevant sections of the resume below that align with the job analysis, and produce a shortened resume tailored to the job requirements. Follow the existing resume format and keep the following in the focused resume:
1. The list of skills focused towards the job description, plus a few more from the existing list to show breadth, following the section's original format
2. A minimum of 4 jobs under work experience and a total of 10 bullet points
3. A minimum of 2 and a maximum of 3 projects, with the same bullet points with possible minor improvements
4. Changes to areas where a section could be enhanced to better match the job description
5. Bold all keywords which will help a recruiter quickly analyze the resume
6. A brief explanation of key decisions made in crafting the resume

JOB ANALYSIS:
{analysis}

RESUME:
{resume}"#;

/// System prompt for the formatting stage — enforces JSON-only output.
pub const FORMATTING_SYSTEM: &str =
    "You are a LaTeX resume strategist. You transcribe a tailored resume into \
    structured field values for a fixed resume template. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Use ONLY facts present in the tailored resume — no invention.";

/// Formatting prompt template. Replace `{tailored_resume}`.
pub const FORMATTING_PROMPT_TEMPLATE: &str = r#"Extract the content of the tailored resume below into field values for the resume template. Return a JSON object with this EXACT schema:
{
  "full_name": "...",
  "email": "...",
  "linkedin_profile": "the profile slug only",
  "phone": "...",
  "city": "...",
  "state": "...",
  "education": [
    {"degree": "...", "major": "...", "university": "...", "start_date": "...", "end_date": "...", "courses": "comma-separated list"}
  ],
  "skill_category": [
    {"skill_category": "Languages", "skills": "comma-separated list"}
  ],
  "job": [
    {"job_title": "...", "company_website": "https://...", "company_name": "...", "city": "...", "state": "...", "start_date": "...", "end_date": "...",
     "achievement": [{"achievement": "one bullet"}]}
  ],
  "project": [
    {"project_name": "...", "description": [{"description": "one bullet"}]}
  ]
}

Every field must be present. Use "" for details the resume does not provide.

TAILORED RESUME:
{tailored_resume}"#;

/// System prompt for the cover-letter stage.
pub const COVER_LETTER_SYSTEM: &str =
    "You are a master of persuasive writing, able to create cover letters that \
    effectively showcase a candidate's fit for a specific role and company culture.";

/// Cover-letter prompt template. Replace `{analysis}` and `{tailored_resume}`.
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"Using the job analysis and the tailored resume below, craft a compelling cover letter that highlights the candidate's qualifications and enthusiasm for the role. Tailor the letter to the specific job and company. Include:
1. An engaging opening paragraph that captures attention and states the purpose
2. 2-3 body paragraphs that highlight the most relevant qualifications, using specific examples from the resume
3. A closing paragraph that reiterates interest and suggests next steps
4. Appropriate tone and style for the industry and company culture
5. A brief explanation of key decisions made in crafting the letter

JOB ANALYSIS:
{analysis}

TAILORED RESUME:
{tailored_resume}"#;

/// The bracket-syntax resume template. `<<name>>` marks a scalar placeholder;
/// `[[tag_start]]`/`[[tag_end]]` bound a repeatable section. The normalizer
/// later rewrites the bracket macro syntax to LaTeX braces.
pub const RESUME_TEMPLATE: &str = r"\documentclass[resume]
\usepackage[implicit=false]{hyperref}
\usepackage{enumitem}
\setlist[topsep=-3pt, itemsep=-3pt]
\usepackage[left=0.45in,top=0.4in,right=0.45in,bottom=0.4in]geometry
\newcommand\tab[1]\hspace.2667\textwidth\rlap#1
\newcommand\MYhref[3][blue]\href#2\color#1#3
\newcommand\itab[1]\hspace0em\rlap#1

\name\Large <<full_name>>
\address\href[mailto:<<email>>]<<email>> \\ \href[https://www.linkedin.com/in/<<linkedin_profile>>]www.linkedin.com/in/<<linkedin_profile>> \\
\href[tel:<<phone>>]<<phone>> \\ <<city>>, <<state>>

\begin[document]

%----------------------------------------------------------------------------------------
%	EDUCATION SECTION
%----------------------------------------------------------------------------------------
\begin[rSection]Education

[[education_start]]
\bf <<degree>>, <<major>> $|$ <<university>> \hfill <<start_date>> - <<end_date>> \\
\bf Courses:  <<courses>>

\vspace0.5pt
[[education_end]]

\end[rSection]

%----------------------------------------------------------------------------------------
% TECHNICAL STRENGTHS
%----------------------------------------------------------------------------------------
\begin[rSection]SKILLS

\begin[tabular][ @[] >\bfseriesl @\hspace[6ex] l ]
[[skill_category_start]]
<<skill_category>> & <<skills>> \\
[[skill_category_end]]
\end[tabular]

\end[rSection]

%----------------------------------------------------------------------------------------
%	WORK EXPERIENCE SECTION
%----------------------------------------------------------------------------------------
\begin[rSection]EXPERIENCE

[[job_start]]
\textbf<<job_title>>, \href[<<company_website>>]<<company_name>> - <<city>>, <<state>> \hfill <<start_date>> - <<end_date>>
\begin[itemize]
    [[achievement_start]]
    \item <<achievement>>
    [[achievement_end]]
\end[itemize]

[[job_end]]

\end[rSection]

\begin[rSection]PROJECTS

[[project_start]]
\item \textbf<<project_name>>
    \begin[itemize]
    [[description_start]]
    \item <<description>>
    [[description_end]]
    \end[itemize]

[[project_end]]

\end[rSection]

\end[document]
";
