//! Gemini generateContent 客户端（reqwest）
//!
//! - 端点：`{base_url}/models/{model}:generateContent?key=...`
//! - 角色映射：user → "user"，assistant → "model"
//! - 状态码分类：429 限流、403 配额、5xx 与连接错误为瞬时故障，其它非 2xx 为终止性失败
//!
//! 凭据只出现在查询参数里；错误信息通过 `without_url` 去掉 URL，避免泄露到日志。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::llm::{CompletionProvider, Credential, GenerateRequest, ProviderFailure};
use crate::transcript::Role;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const GEMINI_PRO: &str = "gemini-2.5-pro";
pub const GEMINI_FLASH: &str = "gemini-2.0-flash";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateBody<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ModelList {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    name: String,
}

/// Gemini 提供方：持有 HTTP Client、base_url 与模型名
pub struct GeminiProvider {
    client: Client,
    base_url: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(base_url: Option<&str>, model: &str, timeout_secs: u64) -> Self {
        let client = match Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(
                    timeout_secs,
                    "HTTP client build failed ({}), using default client without timeout",
                    e.without_url()
                );
                Client::new()
            }
        };
        Self {
            client,
            base_url: base_url
                .unwrap_or(GEMINI_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// 列出该凭据可用的模型名（去掉 `models/` 前缀）
    pub async fn list_models(&self, credential: &Credential) -> Result<Vec<String>, ProviderFailure> {
        let resp = self
            .client
            .get(format!("{}/models", self.base_url))
            .query(&[("key", credential.expose())])
            .send()
            .await
            .map_err(transport_failure)?;
        check_status(resp.status())?;
        let list: ModelList = resp
            .json()
            .await
            .map_err(|e| ProviderFailure::Malformed(e.without_url().to_string()))?;
        Ok(list
            .models
            .into_iter()
            .map(|m| m.name.trim_start_matches("models/").to_string())
            .collect())
    }
}

fn transport_failure(e: reqwest::Error) -> ProviderFailure {
    ProviderFailure::Transient(e.without_url().to_string())
}

fn check_status(status: StatusCode) -> Result<(), ProviderFailure> {
    if status.is_success() {
        return Ok(());
    }
    Err(match status {
        StatusCode::TOO_MANY_REQUESTS => ProviderFailure::RateLimited,
        StatusCode::FORBIDDEN => ProviderFailure::QuotaExceeded,
        s if s.is_server_error() => ProviderFailure::Transient(format!("HTTP {}", s.as_u16())),
        s => ProviderFailure::Other { status: s.as_u16() },
    })
}

fn wire_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "model",
    }
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    async fn generate(
        &self,
        credential: &Credential,
        request: &GenerateRequest,
    ) -> Result<String, ProviderFailure> {
        let body = GenerateBody {
            contents: request
                .contents
                .iter()
                .map(|t| RequestContent {
                    role: wire_role(t.role),
                    parts: [RequestPart { text: &t.content }],
                })
                .collect(),
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens,
            },
        };

        let resp = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .query(&[("key", credential.expose())])
            .json(&body)
            .send()
            .await
            .map_err(transport_failure)?;
        check_status(resp.status())?;

        let data: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| ProviderFailure::Malformed(e.without_url().to_string()))?;

        data.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| ProviderFailure::Malformed("No candidates returned".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::Turn;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> GeminiProvider {
        GeminiProvider::new(Some(&format!("{}/v1beta", server.uri())), GEMINI_PRO, 5)
    }

    fn request() -> GenerateRequest {
        GenerateRequest::new(
            vec![Turn::assistant("Welcome. Ready?"), Turn::user("Ready")],
            0.7,
        )
    }

    #[tokio::test]
    async fn test_generate_sends_gemini_wire_format() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
            .and(query_param("key", "k1"))
            .and(body_partial_json(json!({
                "contents": [
                    {"role": "model", "parts": [{"text": "Welcome. Ready?"}]},
                    {"role": "user", "parts": [{"text": "Ready"}]}
                ],
                "generationConfig": {"temperature": 0.7}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"role": "model", "parts": [{"text": "Breathe in."}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = provider(&server)
            .generate(&Credential::new("k1"), &request())
            .await
            .unwrap();
        assert_eq!(text, "Breathe in.");
    }

    #[tokio::test]
    async fn test_status_codes_are_classified() {
        let cases: [(u16, ProviderFailure); 4] = [
            (429, ProviderFailure::RateLimited),
            (403, ProviderFailure::QuotaExceeded),
            (503, ProviderFailure::Transient("HTTP 503".to_string())),
            (400, ProviderFailure::Other { status: 400 }),
        ];
        for (status, expected) in cases {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(status))
                .mount(&server)
                .await;
            let err = provider(&server)
                .generate(&Credential::new("k"), &request())
                .await
                .unwrap_err();
            assert_eq!(err, expected, "status {status}");
        }
    }

    #[tokio::test]
    async fn test_missing_candidates_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;
        let err = provider(&server)
            .generate(&Credential::new("k"), &request())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderFailure::Malformed(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_max_output_tokens_serialized_when_set() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "generationConfig": {"maxOutputTokens": 10}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "calm"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;
        let req = request().with_max_output_tokens(Some(10));
        let text = provider(&server)
            .generate(&Credential::new("k"), &req)
            .await
            .unwrap();
        assert_eq!(text, "calm");
    }

    #[tokio::test]
    async fn test_list_models_strips_prefix() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1beta/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "models": [{"name": "models/gemini-2.5-pro"}, {"name": "models/gemini-2.0-flash"}]
            })))
            .mount(&server)
            .await;
        let models = provider(&server)
            .list_models(&Credential::new("k"))
            .await
            .unwrap();
        assert_eq!(models, vec!["gemini-2.5-pro", "gemini-2.0-flash"]);
    }

    #[tokio::test]
    async fn test_configured_timeout_applies() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(3))
                    .set_body_json(json!({
                        "candidates": [{"content": {"parts": [{"text": "late"}]}}]
                    })),
            )
            .mount(&server)
            .await;
        let slow = GeminiProvider::new(Some(&format!("{}/v1beta", server.uri())), GEMINI_PRO, 1);
        let err = slow
            .generate(&Credential::new("k"), &request())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderFailure::Transient(_)));
    }
}
