use super::conversation::ConversationState;
use super::memory::WorkingMemory;
use super::policy::{Decision, DecisionPolicy, PolicyRequest};
use super::steps::AgentStep;
use super::tool_call::{ToolCall, ToolExecution, ToolOutput};
use crate::services::prompts::system_instructions;
use crate::tools::CapabilityRegistry;
use crate::types::result::TurnResult;
use crate::{AgentError, Result};
use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{info, warn};

pub const DEFAULT_MAX_ITERATIONS: usize = 6;
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_POLICY_TIMEOUT: Duration = Duration::from_secs(120);

/// Runs one user turn: asks the policy what to do, executes the tools it
/// picks, feeds their results back, and stops at the first reply.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    policy: Arc<dyn DecisionPolicy>,
    registry: Arc<CapabilityRegistry>,
    instructions: String,
    max_iterations: usize,
    tool_timeout: Duration,
    policy_timeout: Duration,
}

impl Orchestrator {
    pub fn new(policy: Arc<dyn DecisionPolicy>, registry: Arc<CapabilityRegistry>) -> Self {
        let instructions = system_instructions(&registry.specs());
        Self {
            policy,
            registry,
            instructions,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tool_timeout: DEFAULT_TOOL_TIMEOUT,
            policy_timeout: DEFAULT_POLICY_TIMEOUT,
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_tool_timeout(mut self, tool_timeout: Duration) -> Self {
        self.tool_timeout = tool_timeout;
        self
    }

    pub fn with_policy_timeout(mut self, policy_timeout: Duration) -> Self {
        self.policy_timeout = policy_timeout;
        self
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Handle one user query against `state`. The exchange is recorded in
    /// `state` only when the turn ends with a reply.
    pub async fn handle(&self, state: &mut ConversationState, query: &str) -> Result<TurnResult> {
        let start_time = Instant::now();
        let specs = self.registry.specs();
        let mut memory = WorkingMemory::new();

        memory.add_step(AgentStep::Task {
            content: query.to_string(),
        });

        for iteration in 1..=self.max_iterations {
            let request = PolicyRequest {
                instructions: &self.instructions,
                tools: &specs,
                history: state.history(),
                working: memory.steps(),
            };

            let decision = timeout(self.policy_timeout, self.policy.decide(request))
                .await
                .map_err(|_| {
                    AgentError::Timeout(format!(
                        "Decision policy did not respond within {}s",
                        self.policy_timeout.as_secs()
                    ))
                })??;

            match decision {
                Decision::Reply(answer) => {
                    memory.add_step(AgentStep::Reply {
                        answer: answer.clone(),
                    });
                    state.record_exchange(query, answer.clone());

                    info!(
                        target: "travel::orchestrator",
                        iterations = iteration,
                        actions = memory.count_actions(),
                        elapsed_ms = start_time.elapsed().as_millis() as u64,
                        "turn completed"
                    );
                    return Ok(TurnResult::new(
                        answer,
                        memory.into_steps(),
                        iteration,
                        start_time.elapsed(),
                    ));
                }
                Decision::ToolCalls(calls) if calls.is_empty() => {
                    return Err(AgentError::InvalidFunctionCall(
                        "Decision requested tools but named none".to_string(),
                    ));
                }
                Decision::ToolCalls(calls) => {
                    for call in &calls {
                        memory.add_step(AgentStep::Action {
                            tool_name: call.name.clone(),
                            tool_call_id: call.id.clone(),
                            arguments: call.arguments.clone(),
                        });
                    }

                    for output in self.execute_calls(&calls).await {
                        memory.add_step(AgentStep::Observation {
                            result: output.as_string(),
                            tool_call_id: output.tool_call_id,
                            tool_name: output.tool_name,
                            is_error: output.is_error,
                        });
                    }
                }
            }
        }

        warn!(
            target: "travel::orchestrator",
            max_iterations = self.max_iterations,
            "turn ended without a reply"
        );
        Err(AgentError::MaxIterations(self.max_iterations))
    }

    /// Execute the calls of one decision concurrently; outputs keep call order.
    /// Each call runs in its own task, so a panicking tool only fails its own call.
    async fn execute_calls(&self, calls: &[ToolCall]) -> Vec<ToolOutput> {
        let handles = calls.iter().cloned().map(|call| {
            let registry = Arc::clone(&self.registry);
            let tool_timeout = self.tool_timeout;
            tokio::spawn(async move { execute_call(&registry, call, tool_timeout).await })
        });

        join_all(handles)
            .await
            .into_iter()
            .zip(calls)
            .map(|(joined, call)| {
                joined.unwrap_or_else(|err| {
                    let err = AgentError::ToolExecution(if err.is_panic() {
                        format!("Tool `{}` panicked", call.name)
                    } else {
                        format!("Tool `{}` was cancelled", call.name)
                    });
                    report_failure(&call.name, &err);
                    ToolExecution::start(call.clone()).fail(err.to_error_payload())
                })
            })
            .collect()
    }
}

async fn execute_call(
    registry: &CapabilityRegistry,
    call: ToolCall,
    tool_timeout: Duration,
) -> ToolOutput {
    let execution = ToolExecution::start(call.clone());
    let outcome = timeout(tool_timeout, registry.execute(&call.name, call.arguments))
        .await
        .unwrap_or_else(|_| {
            Err(AgentError::ToolTimeout {
                tool: call.name.clone(),
                seconds: tool_timeout.as_secs(),
            })
        });

    match outcome {
        Ok(output) => execution.succeed(output),
        Err(err) => {
            report_failure(&call.name, &err);
            execution.fail(err.to_error_payload())
        }
    }
}

fn report_failure(tool: &str, err: &AgentError) {
    warn!(
        target: "travel::orchestrator",
        tool,
        code = err.error_code(),
        error = %err,
        "tool call failed"
    );
}
