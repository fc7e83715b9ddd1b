use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use travel_assistant::core::{AgentStep, ConversationState, Orchestrator, SessionStore};
use travel_assistant::tools::BudgetTool;
use travel_assistant::{
    AgentError, Assistant, Capability, CapabilityRegistry, Decision, DecisionPolicy,
    PolicyRequest, Result, ToolCall, APOLOGY,
};

/// Replays a fixed list of decisions, then repeats `fallback` forever.
#[derive(Debug)]
struct ScriptedPolicy {
    script: Mutex<VecDeque<Decision>>,
    fallback: Decision,
    delay: Duration,
    seen_history: Mutex<Vec<usize>>,
    seen_working: Mutex<Vec<Vec<AgentStep>>>,
}

impl ScriptedPolicy {
    fn new(script: Vec<Decision>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: Decision::Reply("Happy travels!".to_string()),
            delay: Duration::ZERO,
            seen_history: Mutex::new(Vec::new()),
            seen_working: Mutex::new(Vec::new()),
        }
    }

    fn with_fallback(mut self, fallback: Decision) -> Self {
        self.fallback = fallback;
        self
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl DecisionPolicy for ScriptedPolicy {
    async fn decide(&self, request: PolicyRequest<'_>) -> Result<Decision> {
        self.seen_history.lock().unwrap().push(request.history.len());
        self.seen_working
            .lock()
            .unwrap()
            .push(request.working.to_vec());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let next = self.script.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| self.fallback.clone()))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct StubWeatherArgs {
    city: String,
    #[allow(dead_code)]
    date: String,
}

/// Answers instantly, except for "Slowville" which takes `slow` to answer
/// and "Crashville" which panics.
#[derive(Debug, Clone)]
struct StubWeather {
    calls: Arc<AtomicUsize>,
    slow: Duration,
}

#[async_trait]
impl Capability for StubWeather {
    type Args = StubWeatherArgs;

    const NAME: &'static str = "weather_forecast";
    const DESCRIPTION: &'static str = "Weather for a city on a date";

    async fn invoke(&self, args: StubWeatherArgs) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if args.city == "Slowville" {
            tokio::time::sleep(self.slow).await;
        }
        if args.city == "Crashville" {
            panic!("forecast backend crashed");
        }
        Ok(json!({"kind": "forecast", "text": format!("Sunny in {}", args.city)}))
    }
}

fn weather_call(id: &str, city: &str) -> ToolCall {
    ToolCall::new(id, "weather_forecast", json!({"city": city, "date": "tomorrow"}))
}

fn setup(policy: ScriptedPolicy, slow: Duration) -> (Arc<ScriptedPolicy>, Arc<AtomicUsize>, Orchestrator) {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = CapabilityRegistry::new();
    registry.register(BudgetTool::new()).unwrap();
    registry
        .register(StubWeather {
            calls: calls.clone(),
            slow,
        })
        .unwrap();

    let policy = Arc::new(policy);
    let orchestrator = Orchestrator::new(policy.clone(), Arc::new(registry))
        .with_tool_timeout(Duration::from_millis(200))
        .with_policy_timeout(Duration::from_millis(500));
    (policy, calls, orchestrator)
}

#[tokio::test]
async fn weather_only_query_never_touches_the_budget_tool() {
    let (policy, calls, orchestrator) = setup(
        ScriptedPolicy::new(vec![
            Decision::ToolCalls(vec![weather_call("call_1", "Goa")]),
            Decision::Reply("Sunny in Goa tomorrow.".to_string()),
        ]),
        Duration::ZERO,
    );
    let mut state = ConversationState::default();

    let result = orchestrator
        .handle(&mut state, "What's the weather in Goa tomorrow?")
        .await
        .unwrap();

    assert_eq!(result.reply, "Sunny in Goa tomorrow.");
    assert_eq!(result.iterations, 2);
    assert_eq!(result.tools_called(), vec!["weather_forecast"]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // The second decision saw the observation of the first.
    let working = policy.seen_working.lock().unwrap();
    assert_eq!(working[1].len(), 3);
    assert!(matches!(
        &working[1][2],
        AgentStep::Observation { result, is_error: false, .. } if result.contains("Sunny in Goa")
    ));
    assert_eq!(state.exchange_count(), 1);
}

#[tokio::test]
async fn parallel_calls_keep_request_order() {
    let (policy, calls, orchestrator) = setup(
        ScriptedPolicy::new(vec![Decision::ToolCalls(vec![
            weather_call("slow", "Slowville"),
            weather_call("fast", "Goa"),
        ])]),
        Duration::from_millis(50),
    );
    let mut state = ConversationState::default();

    let result = orchestrator.handle(&mut state, "Compare").await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    let ids: Vec<&str> = result
        .steps
        .iter()
        .filter_map(|step| match step {
            AgentStep::Observation { tool_call_id, .. } => Some(tool_call_id.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(ids, vec!["slow", "fast"]);
    assert_eq!(policy.seen_working.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn tool_failures_become_observations() {
    let (_policy, _calls, orchestrator) = setup(
        ScriptedPolicy::new(vec![Decision::ToolCalls(vec![
            ToolCall::new("a", "book_flight", json!({})),
            ToolCall::new(
                "b",
                "estimate_budget",
                json!({"destination": "Goa", "duration": 0, "style": "budget"}),
            ),
            ToolCall::new("c", "estimate_budget", Value::String("{oops".to_string())),
        ])]),
        Duration::ZERO,
    );
    let mut state = ConversationState::default();

    let result = orchestrator.handle(&mut state, "Plan it").await.unwrap();
    let errors = result.errors();
    assert_eq!(errors.len(), 3);
    assert!(errors[0].contains("TOOL_NOT_FOUND"));
    assert!(errors[1].contains("VALIDATION_ERROR"));
    assert!(errors[2].contains("VALIDATION_ERROR"));
    assert_eq!(result.reply, "Happy travels!");
}

#[tokio::test]
async fn slow_tool_times_out_but_the_turn_continues() {
    let (_policy, _calls, orchestrator) = setup(
        ScriptedPolicy::new(vec![Decision::ToolCalls(vec![
            weather_call("slow", "Slowville"),
            weather_call("fast", "Goa"),
        ])]),
        Duration::from_secs(10),
    );
    let mut state = ConversationState::default();

    let result = orchestrator.handle(&mut state, "Weather?").await.unwrap();
    let errors = result.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("TOOL_TIMEOUT"));
    assert_eq!(result.observation_count(), 2);
}

#[tokio::test]
async fn panicking_tool_only_fails_its_own_call() {
    let (_policy, calls, orchestrator) = setup(
        ScriptedPolicy::new(vec![Decision::ToolCalls(vec![
            weather_call("boom", "Crashville"),
            weather_call("fine", "Goa"),
        ])]),
        Duration::ZERO,
    );
    let mut state = ConversationState::default();

    let result = orchestrator.handle(&mut state, "Weather?").await.unwrap();
    let errors = result.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("TOOL_EXECUTION_ERROR"));
    assert!(errors[0].contains("panicked"));
    assert_eq!(result.observation_count(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(result.reply, "Happy travels!");
    assert_eq!(state.exchange_count(), 1);
}

#[tokio::test]
async fn slow_policy_fails_the_turn() {
    let (_policy, _calls, orchestrator) = setup(
        ScriptedPolicy::new(vec![]).with_delay(Duration::from_secs(5)),
        Duration::ZERO,
    );
    let mut state = ConversationState::default();

    let err = orchestrator.handle(&mut state, "Hello").await.unwrap_err();
    assert!(matches!(err, AgentError::Timeout(_)));
    assert!(state.is_empty());
}

#[tokio::test]
async fn endless_tool_use_hits_the_iteration_bound() {
    let (policy, _calls, orchestrator) = setup(
        ScriptedPolicy::new(vec![])
            .with_fallback(Decision::ToolCalls(vec![weather_call("again", "Goa")])),
        Duration::ZERO,
    );
    let orchestrator = orchestrator.with_max_iterations(3);
    let mut state = ConversationState::default();

    let err = orchestrator.handle(&mut state, "Loop").await.unwrap_err();
    assert!(matches!(err, AgentError::MaxIterations(3)));
    assert_eq!(policy.seen_working.lock().unwrap().len(), 3);
    assert!(state.is_empty());
}

#[tokio::test]
async fn history_is_bounded() {
    let (policy, _calls, orchestrator) = setup(ScriptedPolicy::new(vec![]), Duration::ZERO);
    let mut state = ConversationState::new(2);

    for query in ["one", "two", "three", "four"] {
        orchestrator.handle(&mut state, query).await.unwrap();
    }

    assert_eq!(*policy.seen_history.lock().unwrap(), vec![0, 2, 4, 4]);
    assert_eq!(state.exchange_count(), 2);
    assert_eq!(state.history()[0].text, "three");
}

#[tokio::test]
async fn assistant_apologizes_on_failure_and_keeps_sessions_apart() {
    let (policy, _calls, orchestrator) = setup(
        ScriptedPolicy::new(vec![
            Decision::Reply("Hi Alice!".to_string()),
            Decision::ToolCalls(vec![]),
        ]),
        Duration::ZERO,
    );
    let assistant = Assistant::new(orchestrator, SessionStore::new(5));

    let reply = assistant.chat("alice", "Hello").await;
    assert_eq!(reply.response, "Hi Alice!");
    assert!(reply.error.is_none());

    let reply = assistant.chat("bob", "Hello").await;
    assert_eq!(reply.response, APOLOGY);
    assert!(reply.error.is_some());

    let reply = assistant.chat("alice", "Again").await;
    assert_eq!(reply.response, "Happy travels!");
    assert_eq!(*policy.seen_history.lock().unwrap(), vec![0, 0, 2]);
}
