//! Sequential multi-agent pipeline.
//!
//! The fact-check crew runs three tasks in order: content analysis by the
//! video analyst, verification by the fact checker and report writing by the
//! report writer. Every task sees the outputs of all tasks before it.

use crate::agent::Agent;
use crate::config::{Credentials, Prompts, Settings, TaskPrompt};
use crate::error::{FactCheckError, Result};
use crate::gemini::create_chat_client;
use crate::tools::{ToolContext, ToolKind};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub const VIDEO_ANALYST: &str = "video_analyst";
pub const FACT_CHECKER: &str = "fact_checker";
pub const REPORT_WRITER: &str = "report_writer";

/// One step of the pipeline, bound to an agent by name.
#[derive(Debug, Clone)]
pub struct CrewTask {
    pub name: String,
    pub agent: String,
    pub description: String,
    pub expected_output: String,
    /// Where to write this task's output, if anywhere.
    pub output_file: Option<PathBuf>,
}

impl CrewTask {
    pub fn new(name: &str, agent: &str, prompt: &TaskPrompt) -> Self {
        Self {
            name: name.to_string(),
            agent: agent.to_string(),
            description: prompt.description.clone(),
            expected_output: prompt.expected_output.clone(),
            output_file: None,
        }
    }

    pub fn with_output_file(mut self, path: PathBuf) -> Self {
        self.output_file = Some(path);
        self
    }

    /// Task prompt with inputs filled in.
    pub fn prompt(&self, prompts: &Prompts, inputs: &HashMap<String, String>) -> String {
        format!(
            "{}\n\nThis is the expected criteria for your final answer: {}\n\
             You MUST return the actual complete content as the final answer, not a summary.",
            prompts.render_with_custom(&self.description, inputs),
            prompts.render_with_custom(&self.expected_output, inputs)
        )
    }
}

/// Output of a single task.
#[derive(Debug, Clone)]
pub struct TaskOutput {
    pub task: String,
    pub agent: String,
    pub raw: String,
}

/// Output of a full crew run.
#[derive(Debug, Clone)]
pub struct CrewOutput {
    /// Output of the final task.
    pub raw: String,
    pub tasks_output: Vec<TaskOutput>,
}

impl std::fmt::Display for CrewOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// A fixed set of agents and the tasks they run in sequence.
pub struct Crew {
    agents: HashMap<String, Agent>,
    tasks: Vec<CrewTask>,
    prompts: Prompts,
}

impl Crew {
    /// Create a crew, checking that every task is assigned to a known agent.
    pub fn new(agents: Vec<Agent>, tasks: Vec<CrewTask>, prompts: Prompts) -> Result<Self> {
        if tasks.is_empty() {
            return Err(FactCheckError::Crew("A crew needs at least one task".to_string()));
        }

        let agents: HashMap<String, Agent> = agents
            .into_iter()
            .map(|a| (a.name().to_string(), a))
            .collect();

        for task in &tasks {
            if !agents.contains_key(&task.agent) {
                return Err(FactCheckError::Crew(format!(
                    "Task '{}' is assigned to unknown agent '{}'",
                    task.name, task.agent
                )));
            }
        }

        Ok(Self {
            agents,
            tasks,
            prompts,
        })
    }

    /// Build the fact-checking crew from configuration.
    pub fn fact_check(settings: &Settings, prompts: Prompts, credentials: &Credentials) -> Result<Self> {
        let api_key = credentials.gemini_api_key.clone().unwrap_or_else(|| {
            warn!("GEMINI_API_KEY is not set; agent calls will fail");
            String::new()
        });
        let client = create_chat_client(&settings.gemini, &api_key)?;
        let model = settings.agent_model(credentials);
        let context = Arc::new(ToolContext::new(settings, prompts.clone(), credentials)?);
        let max_iterations = settings.agents.max_iterations;

        let agent = |name: &str, persona, tools: &[ToolKind]| {
            Agent::new(name, persona, client.clone(), &model, context.clone())
                .with_tools(tools)
                .with_max_iterations(max_iterations)
        };

        let agents = vec![
            agent(
                VIDEO_ANALYST,
                prompts.agents.video_analyst.clone(),
                &[
                    ToolKind::DownloadVideo,
                    ToolKind::AnalyzeVideo,
                    ToolKind::AnalyzeYoutube,
                    ToolKind::AnalyzeBlog,
                ],
            ),
            agent(
                FACT_CHECKER,
                prompts.agents.fact_checker.clone(),
                &[ToolKind::WebSearch, ToolKind::FactCheck],
            ),
            agent(REPORT_WRITER, prompts.agents.report_writer.clone(), &[]),
        ];

        let tasks = vec![
            CrewTask::new("content_analysis_task", VIDEO_ANALYST, &prompts.tasks.content_analysis),
            CrewTask::new("fact_checking_task", FACT_CHECKER, &prompts.tasks.fact_checking),
            CrewTask::new("report_generation_task", REPORT_WRITER, &prompts.tasks.report_generation)
                .with_output_file(settings.report_path()),
        ];

        Self::new(agents, tasks, prompts)
    }

    pub fn tasks(&self) -> &[CrewTask] {
        &self.tasks
    }

    pub fn agent(&self, name: &str) -> Option<&Agent> {
        self.agents.get(name)
    }

    /// Run every task in order and return the final output.
    #[instrument(skip(self, inputs))]
    pub async fn kickoff(&self, inputs: &HashMap<String, String>) -> Result<CrewOutput> {
        let mut outputs: Vec<TaskOutput> = Vec::with_capacity(self.tasks.len());

        for (i, task) in self.tasks.iter().enumerate() {
            let agent = self
                .agents
                .get(&task.agent)
                .ok_or_else(|| FactCheckError::Crew(format!("Unknown agent '{}'", task.agent)))?
                .clone()
                .interpolate(&self.prompts, inputs);

            info!(
                "Task {}/{}: {} ({})",
                i + 1,
                self.tasks.len(),
                task.name,
                agent.role()
            );

            let context = outputs
                .iter()
                .map(|o| o.raw.as_str())
                .collect::<Vec<_>>()
                .join("\n\n----------\n\n");

            let response = agent
                .run(&task.prompt(&self.prompts, inputs), Some(&context))
                .await
                .map_err(|e| FactCheckError::Crew(format!("Task '{}' failed: {}", task.name, e)))?;

            info!(
                "Task {} finished after {} iteration(s), {} tool call(s)",
                task.name,
                response.iterations,
                response.tool_calls.len()
            );

            if let Some(path) = &task.output_file {
                write_output(path, &response.content)?;
                info!("Wrote {}", path.display());
            }

            outputs.push(TaskOutput {
                task: task.name.clone(),
                agent: task.agent.clone(),
                raw: response.content,
            });
        }

        let raw = outputs.last().map(|o| o.raw.clone()).unwrap_or_default();
        Ok(CrewOutput {
            raw,
            tasks_output: outputs,
        })
    }
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, content)?;
    Ok(())
}

/// Inputs for a crew run on one URL.
pub fn inputs_for(url: &str) -> HashMap<String, String> {
    HashMap::from([("video_url".to_string(), url.to_string())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::test_support::{offline_context, test_client, text_completion};
    use crate::config::AgentPersona;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn agent(name: &str, base: &str) -> Agent {
        Agent::new(
            name,
            AgentPersona {
                role: name.to_string(),
                goal: "goal for {{video_url}}".into(),
                backstory: "backstory".into(),
            },
            test_client(base),
            "m",
            offline_context(),
        )
    }

    #[test]
    fn test_fact_check_crew_constructs_offline() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.general.report_path = dir.path().join("report.md").to_string_lossy().to_string();

        let crew = Crew::fact_check(&settings, Prompts::default(), &Credentials::default()).unwrap();
        let names: Vec<_> = crew.tasks().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["content_analysis_task", "fact_checking_task", "report_generation_task"]
        );
        assert!(crew.agent(REPORT_WRITER).unwrap().tools().is_empty());
        assert_eq!(crew.agent(FACT_CHECKER).unwrap().tools().len(), 2);
        assert!(crew.tasks()[2].output_file.is_some());
    }

    #[test]
    fn test_unknown_agent_is_rejected() {
        let task = CrewTask::new("t", "ghost", &TaskPrompt::default());
        let err = Crew::new(vec![agent("a", "http://localhost")], vec![task], Prompts::default())
            .err()
            .unwrap();
        assert!(err.to_string().contains("unknown agent 'ghost'"));
    }

    #[test]
    fn test_task_prompt_renders_inputs() {
        let prompt = TaskPrompt {
            description: "Analyze {{video_url}}".into(),
            expected_output: "A report".into(),
        };
        let task = CrewTask::new("t", "a", &prompt);
        let text = task.prompt(&Prompts::default(), &inputs_for("https://youtu.be/x"));
        assert!(text.starts_with("Analyze https://youtu.be/x"));
        assert!(text.contains("expected criteria for your final answer: A report"));
    }

    #[tokio::test]
    async fn test_kickoff_passes_context_and_writes_report() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_string_contains("STEP-ONE"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_completion("claims: the sky is green")))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_string_contains("STEP-TWO"))
            .and(body_string_contains("claims: the sky is green"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_completion("verdict: FALSE")))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_string_contains("STEP-THREE"))
            .and(body_string_contains("claims: the sky is green"))
            .and(body_string_contains("verdict: FALSE"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_completion("# Fact-Check Report")))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let report = dir.path().join("out").join("report.md");
        let step = |n: &str| TaskPrompt {
            description: format!("{} for {{{{video_url}}}}", n),
            expected_output: "text".into(),
        };

        let crew = Crew::new(
            vec![agent("a", &server.uri()), agent("b", &server.uri())],
            vec![
                CrewTask::new("one", "a", &step("STEP-ONE")),
                CrewTask::new("two", "b", &step("STEP-TWO")),
                CrewTask::new("three", "a", &step("STEP-THREE")).with_output_file(report.clone()),
            ],
            Prompts::default(),
        )
        .unwrap();

        let output = crew.kickoff(&inputs_for("https://youtu.be/x")).await.unwrap();
        assert_eq!(output.raw, "# Fact-Check Report");
        assert_eq!(output.tasks_output.len(), 3);
        assert_eq!(output.tasks_output[1].raw, "verdict: FALSE");
        assert_eq!(std::fs::read_to_string(&report).unwrap(), "# Fact-Check Report");
    }

    #[tokio::test]
    async fn test_kickoff_aborts_on_task_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": { "message": "Quota exceeded", "type": "invalid_request_error", "param": null, "code": null }
            })))
            .mount(&server)
            .await;

        let crew = Crew::new(
            vec![agent("a", &server.uri())],
            vec![CrewTask::new("one", "a", &TaskPrompt::default())],
            Prompts::default(),
        )
        .unwrap();

        let err = crew.kickoff(&inputs_for("u")).await.unwrap_err();
        assert!(err.to_string().contains("Task 'one' failed"));
    }
}
