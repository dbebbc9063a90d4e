#![allow(dead_code)]

use async_trait::async_trait;
use deskpilot_core::{DriveShortcut, PathResolver, PathStyle};
use deskpilot_providers::{GenerateResponse, LLMProvider, Message, ProviderError};
use deskpilot_tools::os::control::ControlSurface;
use deskpilot_tools::os::process::{ProcessProbe, Spawner};
use deskpilot_tools::{HandlerContext, HandlerSettings, OsError, OsResult, Platform};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub struct MockProbe {
    pub names: Vec<String>,
    pub fail: bool,
}

impl MockProbe {
    pub fn running(names: &[&str]) -> Self {
        Self {
            names: names.iter().map(|n| n.to_string()).collect(),
            fail: false,
        }
    }

    pub fn broken() -> Self {
        Self {
            names: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl ProcessProbe for MockProbe {
    async fn running_names(&self) -> OsResult<Vec<String>> {
        if self.fail {
            return Err(OsError::OperationFailed("process table locked".to_string()));
        }
        Ok(self.names.clone())
    }
}

#[derive(Default)]
pub struct RecordingSpawner {
    pub calls: Mutex<Vec<(String, Vec<String>)>>,
    pub fail: bool,
}

impl RecordingSpawner {
    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Spawner for RecordingSpawner {
    async fn spawn(&self, program: &str, args: &[String]) -> OsResult<u32> {
        self.calls
            .lock()
            .unwrap()
            .push((program.to_string(), args.to_vec()));
        if self.fail {
            return Err(OsError::NotFound(program.to_string()));
        }
        Ok(4242)
    }
}

pub struct MockSurface {
    pub brightness: Mutex<u8>,
    pub volume: Mutex<f32>,
    pub bluetooth: Mutex<Option<bool>>,
}

impl MockSurface {
    pub fn new(brightness: u8, volume: f32) -> Self {
        Self {
            brightness: Mutex::new(brightness),
            volume: Mutex::new(volume),
            bluetooth: Mutex::new(None),
        }
    }
}

#[async_trait]
impl ControlSurface for MockSurface {
    async fn brightness(&self) -> OsResult<u8> {
        Ok(*self.brightness.lock().unwrap())
    }

    async fn set_brightness(&self, percent: u8) -> OsResult<()> {
        *self.brightness.lock().unwrap() = percent;
        Ok(())
    }

    async fn volume(&self) -> OsResult<f32> {
        Ok(*self.volume.lock().unwrap())
    }

    async fn set_volume(&self, level: f32) -> OsResult<()> {
        *self.volume.lock().unwrap() = level;
        Ok(())
    }

    async fn set_bluetooth(&self, enabled: bool) -> OsResult<()> {
        *self.bluetooth.lock().unwrap() = Some(enabled);
        Ok(())
    }
}

/// Replies from a queue; an `Err` entry becomes an HTTP failure.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, String>>>,
    pub calls: AtomicUsize,
    pub prompts: Mutex<Vec<String>>,
    /// Roles of every message in the most recent request.
    pub last_roles: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<Result<&str, &str>>) -> Self {
        Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
            last_roles: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn generate(&self, messages: &[Message]) -> Result<GenerateResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_roles.lock().unwrap() = messages.iter().map(|m| m.role.clone()).collect();
        if let Some(last) = messages.last() {
            self.prompts.lock().unwrap().push(last.content.clone());
        }
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(GenerateResponse {
                content: Some(text),
                finish_reason: "stop".to_string(),
            }),
            Some(Err(e)) => Err(ProviderError::Http(e)),
            None => Err(ProviderError::Http("no scripted reply".to_string())),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Mocks wired into a Linux-flavoured context rooted at `root`, where the
/// phrase "d drive" means `root`.
pub struct Harness {
    pub ctx: HandlerContext,
    pub spawner: Arc<RecordingSpawner>,
    pub surface: Arc<MockSurface>,
    pub provider: Arc<ScriptedProvider>,
}

pub fn resolver(root: &Path) -> PathResolver {
    let root = root.display().to_string();
    PathResolver::new(PathStyle::Posix, vec![DriveShortcut::new("d drive", root.clone())])
        .with_base_dir(root.clone())
        .with_allowed_roots(vec![root])
}

pub fn harness(root: &Path, probe: MockProbe, provider: ScriptedProvider) -> Harness {
    let spawner = Arc::new(RecordingSpawner::default());
    let surface = Arc::new(MockSurface::new(90, 0.4));
    let provider = Arc::new(provider);

    let mut settings = HandlerSettings::for_platform(Platform::Linux);
    settings.output_dir = root.join("out");

    let ctx = HandlerContext::new(resolver(root), provider.clone(), settings)
        .with_processes(Arc::new(probe))
        .with_spawner(spawner.clone())
        .with_surface(surface.clone());

    Harness {
        ctx,
        spawner,
        surface,
        provider,
    }
}
