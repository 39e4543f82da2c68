//! Agent runner with tool calling loop.

use crate::config::{AgentPersona, Prompts};
use crate::error::{FactCheckError, Result};
use crate::tools::{parse_tool_call, tool_definitions, ToolContext, ToolKind};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// A role-scoped LLM agent with a fixed set of tools.
#[derive(Clone)]
pub struct Agent {
    name: String,
    persona: AgentPersona,
    client: Client<OpenAIConfig>,
    model: String,
    tools: Vec<ToolKind>,
    context: Arc<ToolContext>,
    max_iterations: usize,
}

impl Agent {
    /// Create a new agent without tools.
    pub fn new(
        name: &str,
        persona: AgentPersona,
        client: Client<OpenAIConfig>,
        model: &str,
        context: Arc<ToolContext>,
    ) -> Self {
        Self {
            name: name.to_string(),
            persona,
            client,
            model: model.to_string(),
            tools: Vec::new(),
            context,
            max_iterations: 15,
        }
    }

    /// Give the agent a set of tools.
    pub fn with_tools(mut self, tools: &[ToolKind]) -> Self {
        self.tools = tools.to_vec();
        self
    }

    /// Set maximum iterations for the agent loop.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Fill `{{name}}` placeholders in the persona from run inputs and the
    /// configured prompt variables. Run inputs win on conflicts.
    pub fn interpolate(mut self, prompts: &Prompts, inputs: &HashMap<String, String>) -> Self {
        self.persona = AgentPersona {
            role: prompts.render_with_custom(&self.persona.role, inputs),
            goal: prompts.render_with_custom(&self.persona.goal, inputs),
            backstory: prompts.render_with_custom(&self.persona.backstory, inputs),
        };
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> &str {
        &self.persona.role
    }

    pub fn tools(&self) -> &[ToolKind] {
        &self.tools
    }

    /// System prompt derived from the persona.
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}. {}\nYour personal goal is: {}\n\n\
             When you have gathered enough information, reply with your final answer \
             without calling any more tools.",
            self.persona.role, self.persona.backstory, self.persona.goal
        )
    }

    /// Run the agent with a task and optional context from earlier steps.
    #[instrument(skip(self, task, context), fields(agent = %self.name))]
    pub async fn run(&self, task: &str, context: Option<&str>) -> Result<AgentResponse> {
        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.system_prompt())
                .build()
                .map_err(|e| FactCheckError::Agent(e.to_string()))?
                .into(),
        ];

        let user_message = match context {
            Some(ctx) if !ctx.trim().is_empty() => {
                format!("{}\n\nThis is the context you're working with:\n{}", task, ctx)
            }
            _ => task.to_string(),
        };

        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_message)
                .build()
                .map_err(|e| FactCheckError::Agent(e.to_string()))?
                .into(),
        );

        let definitions = tool_definitions(&self.tools);
        let mut iterations = 0;
        let mut tool_calls_made = Vec::new();

        loop {
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(FactCheckError::Agent(format!(
                    "Agent '{}' exceeded maximum iterations ({})",
                    self.name, self.max_iterations
                )));
            }

            debug!("Agent iteration {}", iterations);

            let mut builder = CreateChatCompletionRequestArgs::default();
            builder.model(&self.model).messages(messages.clone());
            if !definitions.is_empty() {
                builder.tools(definitions.clone());
            }
            let request = builder
                .build()
                .map_err(|e| FactCheckError::Agent(e.to_string()))?;

            let response = self
                .client
                .chat()
                .create(request)
                .await
                .map_err(|e| FactCheckError::Gemini(format!("Agent API error: {}", e)))?;

            let choice = response
                .choices
                .first()
                .ok_or_else(|| FactCheckError::Agent("No response from model".to_string()))?;

            let tool_calls = match &choice.message.tool_calls {
                Some(calls) if !calls.is_empty() => calls,
                _ => {
                    return Ok(AgentResponse {
                        content: choice.message.content.clone().unwrap_or_default(),
                        tool_calls: tool_calls_made,
                        iterations,
                    });
                }
            };

            let assistant_msg = ChatCompletionRequestAssistantMessageArgs::default()
                .tool_calls(tool_calls.clone())
                .build()
                .map_err(|e| FactCheckError::Agent(e.to_string()))?;
            messages.push(assistant_msg.into());

            for tool_call in tool_calls {
                let record = self.execute_tool_call(tool_call).await;

                let tool_msg = ChatCompletionRequestToolMessageArgs::default()
                    .tool_call_id(&tool_call.id)
                    .content(record.result.clone())
                    .build()
                    .map_err(|e| FactCheckError::Agent(e.to_string()))?;
                messages.push(tool_msg.into());

                tool_calls_made.push(record);
            }
        }
    }

    /// Execute a single tool call and return a record of it.
    async fn execute_tool_call(&self, tool_call: &ChatCompletionMessageToolCall) -> ToolCallRecord {
        let name = &tool_call.function.name;
        let arguments = &tool_call.function.arguments;

        info!("Agent calling tool: {} with args: {}", name, arguments);

        let result = match parse_tool_call(name, arguments) {
            Ok(tool) if self.tools.contains(&tool.kind()) => self.context.execute(&tool).await,
            Ok(_) => format!("Error: tool '{}' is not available to this agent", name),
            Err(e) => format!("Failed to parse tool call: {}", e),
        };

        ToolCallRecord {
            name: name.clone(),
            arguments: arguments.clone(),
            result,
        }
    }
}

/// Response from an agent run.
#[derive(Debug)]
pub struct AgentResponse {
    /// The final response content from the agent.
    pub content: String,
    /// Record of all tool calls made during execution.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of iterations (LLM calls) used.
    pub iterations: usize,
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    pub name: String,
    pub arguments: String,
    pub result: String,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}
