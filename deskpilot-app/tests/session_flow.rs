use async_trait::async_trait;
use deskpilot_app::{repl, Session};
use deskpilot_core::{DriveShortcut, PathResolver, PathStyle};
use deskpilot_interfaces::ScriptedInterface;
use deskpilot_providers::{GenerateResponse, LLMProvider, Message, ProviderError};
use deskpilot_tools::os::control::UnsupportedSurface;
use deskpilot_tools::os::process::{ProcessProbe, Spawner};
use deskpilot_tools::{HandlerContext, HandlerSettings, OsResult, Platform};
use std::path::Path;
use std::sync::{Arc, Mutex};

struct NothingRunning;

#[async_trait]
impl ProcessProbe for NothingRunning {
    async fn running_names(&self) -> OsResult<Vec<String>> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
struct Spawned(Mutex<Vec<String>>);

#[async_trait]
impl Spawner for Spawned {
    async fn spawn(&self, program: &str, _args: &[String]) -> OsResult<u32> {
        self.0.lock().unwrap().push(program.to_string());
        Ok(1)
    }
}

struct Offline;

#[async_trait]
impl LLMProvider for Offline {
    async fn generate(&self, _messages: &[Message]) -> Result<GenerateResponse, ProviderError> {
        Err(ProviderError::Http("offline".to_string()))
    }

    fn name(&self) -> &str {
        "offline"
    }
}

/// Remembers how many messages each request carried.
#[derive(Default)]
struct Counting(Mutex<Vec<usize>>);

#[async_trait]
impl LLMProvider for Counting {
    async fn generate(&self, messages: &[Message]) -> Result<GenerateResponse, ProviderError> {
        self.0.lock().unwrap().push(messages.len());
        Ok(GenerateResponse {
            content: Some("print('ok')".to_string()),
            finish_reason: "stop".to_string(),
        })
    }

    fn name(&self) -> &str {
        "counting"
    }
}

fn session(root: &Path, spawned: Arc<Spawned>) -> Session {
    session_with(root, spawned, Arc::new(Offline))
}

fn session_with(root: &Path, spawned: Arc<Spawned>, provider: Arc<dyn LLMProvider>) -> Session {
    let mut settings = HandlerSettings::for_platform(Platform::Linux);
    settings.output_dir = root.join("out");
    let root = root.display().to_string();
    let resolver = PathResolver::new(PathStyle::Posix, vec![DriveShortcut::new("d drive", root.clone())])
        .with_base_dir(root.clone())
        .with_allowed_roots(vec![root]);
    let ctx = HandlerContext::new(
        resolver,
        provider,
        settings,
    )
    .with_processes(Arc::new(NothingRunning))
    .with_spawner(spawned)
    .with_surface(Arc::new(UnsupportedSurface::new("test")));
    Session::with_context(ctx)
}

#[tokio::test]
async fn test_turn_records_both_sides() {
    let root = tempfile::tempdir().unwrap();
    let mut session = session(root.path(), Arc::default());

    let reply = session.turn("calculate 3+5*2").await;

    assert_eq!(reply, "Result: 3+5*2 = 13");
    let messages = session.history().messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].content, "calculate 3+5*2");
    assert_eq!(messages[1].content, reply);
}

#[tokio::test]
async fn test_failed_turn_still_recorded() {
    let root = tempfile::tempdir().unwrap();
    let mut session = session(root.path(), Arc::default());

    let reply = session.turn("write python code for bubble sort").await;

    assert!(reply.starts_with("Error: Generation failed"), "{}", reply);
    assert_eq!(session.history().len(), 2);
}

#[tokio::test]
async fn test_earlier_turns_reach_the_provider() {
    let root = tempfile::tempdir().unwrap();
    let provider = Arc::new(Counting::default());
    let mut session = session_with(root.path(), Arc::default(), provider.clone());

    session.turn("write python code for sorting").await;
    session.turn("calculate 1+1").await;
    session.turn("write python code for searching").await;

    // system + prompt, then system + four earlier messages + prompt
    assert_eq!(provider.0.lock().unwrap().clone(), vec![2, 6]);
}

#[tokio::test]
async fn test_shell_loop_end_to_end() {
    let root = tempfile::tempdir().unwrap();
    let spawned = Arc::new(Spawned::default());
    let mut session = session(root.path(), spawned.clone());
    let export = root.path().join("logs").join("chat.json");

    let ui = ScriptedInterface::new(vec![
        "create folder named Reports in D drive".to_string(),
        "open firefox".to_string(),
        "".to_string(),
        "/route increase brightness".to_string(),
        "history".to_string(),
        format!("/export {}", export.display()),
        "exit".to_string(),
        "calculate 1+1".to_string(),
    ]);

    repl::run(&mut session, &ui).await.unwrap();

    assert!(root.path().join("Reports").is_dir());
    assert_eq!(spawned.0.lock().unwrap().clone(), vec!["firefox"]);

    let outputs = ui.outputs();
    assert!(outputs[1].starts_with("Successfully created folder"));
    assert_eq!(outputs[2], "Successfully launched firefox");
    assert!(outputs[3].starts_with("intent: system_control"));
    assert!(outputs[4].starts_with("You: create folder named Reports in D drive"));
    assert!(outputs[5].starts_with("[status] Exported 4 messages"));
    assert_eq!(outputs.last().map(String::as_str), Some("Goodbye!"));

    // Nothing after "exit" runs, and /route never executes.
    assert_eq!(session.history().len(), 4);

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&export).unwrap()).unwrap();
    assert_eq!(saved[0]["role"], "user");
    assert_eq!(saved[1]["role"], "assistant");
    assert_eq!(saved.as_array().map(Vec::len), Some(4));
}

#[tokio::test]
async fn test_clear_and_usage_errors() {
    let root = tempfile::tempdir().unwrap();
    let mut session = session(root.path(), Arc::default());
    let ui = ScriptedInterface::new(["calculate 2*2", "clear", "/export", "history"]);

    repl::run(&mut session, &ui).await.unwrap();

    let outputs = ui.outputs();
    assert_eq!(outputs[1], "Result: 2*2 = 4");
    assert_eq!(outputs[2], "[status] History cleared");
    assert_eq!(outputs[3], "[error] Usage: /export <file>");
    assert_eq!(outputs[4], "(no messages yet)");
    assert!(session.history().is_empty());
}
