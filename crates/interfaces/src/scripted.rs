use crate::traits::Interface;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Feeds canned lines and records everything written back.
#[derive(Default)]
pub struct ScriptedInterface {
    inputs: Mutex<VecDeque<String>>,
    outputs: Mutex<Vec<String>>,
}

impl ScriptedInterface {
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: Mutex::new(inputs.into_iter().map(Into::into).collect()),
            outputs: Mutex::new(Vec::new()),
        }
    }

    pub fn outputs(&self) -> Vec<String> {
        self.outputs
            .lock()
            .map(|outputs| outputs.clone())
            .unwrap_or_default()
    }

    fn record(&self, line: String) {
        if let Ok(mut outputs) = self.outputs.lock() {
            outputs.push(line);
        }
    }
}

#[async_trait]
impl Interface for ScriptedInterface {
    async fn receive_input(&self) -> Option<String> {
        self.inputs
            .lock()
            .ok()
            .and_then(|mut inputs| inputs.pop_front())
            .map(|line| line.trim().to_string())
    }

    async fn send_output(&self, message: &str) {
        self.record(message.to_string());
    }

    async fn show_status(&self, status: &str) {
        self.record(format!("[status] {}", status));
    }

    async fn show_error(&self, error: &str) {
        self.record(format!("[error] {}", error));
    }
}
