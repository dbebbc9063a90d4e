use crate::traits::*;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

pub struct OpenAICompatibleProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: Option<f32>,
}

impl OpenAICompatibleProvider {
    pub fn new(base_url: String, api_key: Option<String>, model: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    fn request_body(&self, messages: &[Message]) -> serde_json::Value {
        let mut body = json!({
            "model": self.model,
            "messages": messages,
        });

        if let Some(temperature) = self.temperature {
            body["temperature"] = json!(temperature);
        }
        body
    }
}

fn parse_response(json: &serde_json::Value) -> Result<GenerateResponse, ProviderError> {
    if let Some(message) = json["error"]["message"].as_str() {
        return Err(ProviderError::Api(message.to_string()));
    }

    let choice = json["choices"]
        .get(0)
        .ok_or_else(|| ProviderError::Parse("No choices in response".to_string()))?;

    let content = choice["message"]["content"].as_str().map(|s| s.to_string());
    let finish_reason = choice["finish_reason"]
        .as_str()
        .unwrap_or("stop")
        .to_string();

    Ok(GenerateResponse {
        content,
        finish_reason,
    })
}

#[async_trait]
impl LLMProvider for OpenAICompatibleProvider {
    async fn generate(&self, messages: &[Message]) -> Result<GenerateResponse, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        tracing::debug!(%url, model = %self.model, messages = messages.len(), "Requesting completion");

        let mut request = self.client.post(&url).json(&self.request_body(messages));

        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api(format!("{}: {}", status, text)));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        parse_response(&json)
    }

    fn name(&self) -> &str {
        "OpenAI Compatible"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body() {
        let provider = OpenAICompatibleProvider::new(
            "http://localhost:11434/v1/".to_string(),
            None,
            "llama3".to_string(),
        )
        .with_temperature(0.2);

        let body = provider.request_body(&[Message::user("hi")]);
        assert_eq!(body["model"], "llama3");
        assert_eq!(body["messages"][0]["role"], "user");
        assert!((body["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
        assert_eq!(provider.base_url, "http://localhost:11434/v1");
    }

    #[test]
    fn test_parse_response() {
        let json = json!({
            "choices": [{"message": {"content": "print('hi')"}, "finish_reason": "stop"}]
        });
        let response = parse_response(&json).unwrap();
        assert_eq!(response.content.as_deref(), Some("print('hi')"));
        assert_eq!(response.finish_reason, "stop");

        assert!(matches!(
            parse_response(&json!({"choices": []})),
            Err(ProviderError::Parse(_))
        ));
        assert!(matches!(
            parse_response(&json!({"error": {"message": "bad key"}})),
            Err(ProviderError::Api(_))
        ));
    }

    struct Silent;

    #[async_trait]
    impl LLMProvider for Silent {
        async fn generate(&self, _messages: &[Message]) -> Result<GenerateResponse, ProviderError> {
            Ok(GenerateResponse {
                content: Some("   ".to_string()),
                finish_reason: "stop".to_string(),
            })
        }

        fn name(&self) -> &str {
            "silent"
        }
    }

    #[tokio::test]
    async fn test_complete_rejects_blank_text() {
        assert!(matches!(
            Silent.complete("system", &[], "prompt").await,
            Err(ProviderError::Empty)
        ));
    }

    struct Recorder(std::sync::Mutex<Vec<Message>>);

    #[async_trait]
    impl LLMProvider for Recorder {
        async fn generate(&self, messages: &[Message]) -> Result<GenerateResponse, ProviderError> {
            *self.0.lock().unwrap() = messages.to_vec();
            Ok(GenerateResponse {
                content: Some("ok".to_string()),
                finish_reason: "stop".to_string(),
            })
        }

        fn name(&self) -> &str {
            "recorder"
        }
    }

    #[tokio::test]
    async fn test_complete_places_context_between_system_and_prompt() {
        let recorder = Recorder(std::sync::Mutex::new(Vec::new()));
        let context = [Message::user("open notepad"), Message::assistant("Successfully launched notepad")];

        recorder.complete("be brief", &context, "now write a poem").await.unwrap();

        let sent = recorder.0.lock().unwrap().clone();
        let roles: Vec<&str> = sent.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
        assert_eq!(sent[3].content, "now write a poem");
    }
}
