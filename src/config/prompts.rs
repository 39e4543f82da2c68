//! Prompt templates for the fact-checking crew.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory:
//! `agents.toml`, `tasks.toml` and `analysis.toml`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub agents: AgentPrompts,
    pub tasks: TaskPrompts,
    /// Prompts sent to Gemini together with an uploaded video.
    pub analysis: AnalysisPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Role, goal and backstory of one agent.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AgentPersona {
    pub role: String,
    pub goal: String,
    pub backstory: String,
}

/// Personas for the three crew members.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentPrompts {
    pub video_analyst: AgentPersona,
    pub fact_checker: AgentPersona,
    pub report_writer: AgentPersona,
}

impl Default for AgentPrompts {
    fn default() -> Self {
        Self {
            video_analyst: AgentPersona {
                role: "Video Content Analyst".to_string(),
                goal: "Extract every verifiable claim, the people involved and the visual \
                       and spoken context from the content at {{video_url}}"
                    .to_string(),
                backstory: "You are a meticulous media analyst. You watch videos frame by frame \
                            and read articles line by line, and you never report something \
                            you did not actually observe in the source."
                    .to_string(),
            },
            fact_checker: AgentPersona {
                role: "Investigative Fact Checker".to_string(),
                goal: "Verify each extracted claim against credible, independent sources \
                       and assign an evidence-backed verdict"
                    .to_string(),
                backstory: "You have spent years at a fact-checking desk. You search widely, \
                            prefer primary sources and reputable outlets, note publication \
                            dates, and say UNVERIFIED when the evidence is thin."
                    .to_string(),
            },
            report_writer: AgentPersona {
                role: "Fact-Check Report Writer".to_string(),
                goal: "Turn the analysis and verification results into a clear, well \
                       structured Markdown fact-check report"
                    .to_string(),
                backstory: "You write for a general audience. Your reports lead with the \
                            verdict, cite every source and never overstate certainty."
                    .to_string(),
            },
        }
    }
}

/// One step of the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TaskPrompt {
    pub description: String,
    pub expected_output: String,
}

/// Descriptions of the three sequential tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskPrompts {
    pub content_analysis: TaskPrompt,
    pub fact_checking: TaskPrompt,
    pub report_generation: TaskPrompt,
}

impl Default for TaskPrompts {
    fn default() -> Self {
        Self {
            content_analysis: TaskPrompt {
                description: r#"Analyze the content at this URL: {{video_url}}

Decide what kind of content it is and use the matching tool:
- YouTube links (youtube.com, youtu.be, youtube.com/shorts): use 'analyze_youtube' with the URL.
- Instagram reels or posts: use 'analyze_video' with the URL directly.
- Other video links: use 'download_video' first, then 'analyze_video' with the returned file path.
- Blogs, news articles and other web pages: use 'analyze_blog'.

From the tool output, identify the people involved, the setting, what is said and shown,
and list the TOP 2-3 most important factual claims that can be verified."#
                    .to_string(),
                expected_output: "A detailed content analysis including metadata, people, visual \
                                  and audio content, and a numbered list of the key verifiable claims."
                    .to_string(),
            },
            fact_checking: TaskPrompt {
                description: r#"Fact-check the key claims identified in the content analysis of {{video_url}}.

For each claim:
1. Search the web for credible sources that confirm or refute it.
2. Cross-reference at least two independent sources where possible.
3. Assign a verdict: TRUE, FALSE, MISLEADING or UNVERIFIED.
4. Record the evidence, the source URLs with publication dates, and a confidence score (0-100%)."#
                    .to_string(),
                expected_output: "For every claim: the claim text, verdict, evidence summary, \
                                  source URLs with dates, and a confidence score."
                    .to_string(),
            },
            report_generation: TaskPrompt {
                description: r#"Write the final fact-check report for {{video_url}}.

Structure the report in Markdown with these sections:
# Fact-Check Report
## Summary (overall verdict and one-paragraph overview)
## Content Overview (what the content is, who appears in it)
## Claims Analysis (one subsection per claim with verdict, evidence and sources)
## Credibility Assessment (red flags, manipulation indicators, source reliability)
## Sources (every URL cited)

Do not wrap the report in code fences."#
                    .to_string(),
                expected_output: "A complete Markdown fact-check report.".to_string(),
            },
        }
    }
}

/// Prompts for Gemini video understanding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisPrompts {
    /// Used for local files and other videos without metadata.
    pub generic: String,
    /// Used for Instagram reels. Variables: author, title, description, upload_date, views.
    pub instagram: String,
    /// Used for YouTube videos. Variables: title, channel, description, upload_date,
    /// views, duration, tags.
    pub youtube: String,
}

impl Default for AnalysisPrompts {
    fn default() -> Self {
        Self {
            generic: r#"Analyze this video thoroughly and provide:

1. PEOPLE IDENTIFICATION:
   - Identify any people visible in the video
   - If they appear to be public figures or well-known personalities, identify them
   - Describe their appearance and role

2. VISUAL CONTENT (DETAILED):
   - Main subjects and objects visible
   - Scene descriptions and settings
   - Any text overlays, captions, or graphics
   - Notable visual elements or symbols

3. ACTIVITIES AND ACTIONS:
   - What are people doing in the video?
   - Describe all significant actions

4. AUDIO/SPEECH CONTENT:
   - Transcribe any spoken words or dialogue
   - Background sounds or music
   - Tone and emotion of speakers

5. CLAIMS AND STATEMENTS:
   - List all factual claims made (visual or audio)
   - Identify any news, events, or incidents mentioned
   - Note dates, locations, names, or specific details

6. CONTEXT:
   - Apparent purpose of the video
   - Any indicators of source or credibility
   - Potential red flags or suspicious elements

Be detailed and objective in your analysis."#
                .to_string(),

            instagram: r#"Analyze this Instagram video in DETAIL. Use the metadata provided to enhance your analysis.

VIDEO METADATA:
- Author: {{author}}
- Title/Caption: {{title}}
- Description: {{description}}
- Upload Date: {{upload_date}}
- Views: {{views}}

Now analyze the video content thoroughly:

1. PEOPLE IDENTIFICATION:
   - Identify any people visible in the video
   - If they appear to be public figures, celebrities, influencers, or well-known personalities, identify them
   - Describe their appearance, clothing, and demeanor
   - Note their role in the video

2. VISUAL CONTENT (DETAILED):
   - Main subjects and objects visible (be specific)
   - Scene descriptions and settings
   - Any text overlays, captions, graphics, or on-screen text
   - Notable visual elements, symbols, logos, or branding
   - Camera angles, editing style, production quality
   - Any filters or effects applied

3. ACTIVITIES AND ACTIONS:
   - What are people doing in the video?
   - Describe all significant actions and activities
   - Note any demonstrations, performances, or interactions

4. AUDIO/SPEECH CONTENT (DETAILED):
   - Transcribe ALL spoken words and dialogue
   - Note the speaker's tone and emotion
   - Background sounds, music, or sound effects

5. CLAIMS AND STATEMENTS:
   - List ALL factual claims made (visual or audio)
   - Identify any news, events, or incidents mentioned
   - Note dates, locations, names, or specific details
   - Focus on the TOP 2-3 most important verifiable claims

6. CONTEXT AND CREDIBILITY:
   - Apparent purpose of the video (entertainment, news, educational, promotional, etc.)
   - Potential red flags or suspicious elements
   - Relationship between caption and actual content

Be extremely detailed and objective."#
                .to_string(),

            youtube: r#"Analyze this YouTube video in DETAIL. Use the metadata provided to enhance your analysis.

VIDEO METADATA:
- Title: {{title}}
- Channel: {{channel}}
- Description: {{description}}
- Upload Date: {{upload_date}}
- Views: {{views}}
- Duration: {{duration}} seconds
- Tags: {{tags}}

Now analyze the video content thoroughly:

1. PEOPLE IDENTIFICATION:
   - Identify any people visible in the video
   - If they appear to be public figures, celebrities, or well-known personalities, identify them by name
   - Describe their appearance, clothing, and demeanor
   - Note their role in the video (speaker, subject, interviewer, etc.)

2. VISUAL CONTENT (DETAILED):
   - Main subjects and objects visible (be specific)
   - Scene descriptions and settings (indoor/outdoor, location type)
   - Any text overlays, captions, graphics, or on-screen text
   - Notable visual elements, symbols, logos, or branding
   - Camera angles, editing style, production quality
   - Any visual effects or AI-generated content indicators

3. ACTIVITIES AND ACTIONS:
   - What are people doing in the video?
   - Describe all significant actions and activities
   - Note any demonstrations, experiments, or performances
   - Identify the main purpose or goal of the activities shown

4. AUDIO/SPEECH CONTENT (DETAILED):
   - Transcribe ALL spoken words and dialogue
   - Note the speaker's tone, emotion, and speaking style
   - Background sounds, music, or sound effects
   - Any audio cues that provide context

5. CLAIMS AND STATEMENTS:
   - List ALL factual claims made (visual or audio)
   - Identify any news, events, or incidents mentioned
   - Note dates, locations, names, or specific details
   - Distinguish between facts, opinions, and speculation
   - Focus on the TOP 2-3 most important verifiable claims

6. CONTEXT AND CREDIBILITY:
   - Apparent purpose of the video (news, entertainment, educational, satire, etc.)
   - Source credibility indicators (verified channel, professional production, etc.)
   - Potential red flags or suspicious elements
   - Relationship between title/description and actual content
   - Any signs of manipulation, deepfakes, or AI-generated content

Be extremely detailed and objective. Use the metadata to provide context for your analysis."#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let agents_path = custom_path.join("agents.toml");
            if agents_path.exists() {
                let content = std::fs::read_to_string(&agents_path)?;
                prompts.agents = toml::from_str(&content)?;
            }

            let tasks_path = custom_path.join("tasks.toml");
            if tasks_path.exists() {
                let content = std::fs::read_to_string(&tasks_path)?;
                prompts.tasks = toml::from_str(&content)?;
            }

            let analysis_path = custom_path.join("analysis.toml");
            if analysis_path.exists() {
                let content = std::fs::read_to_string(&analysis_path)?;
                prompts.analysis = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
