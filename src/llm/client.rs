//! 带凭据轮换的补全客户端
//!
//! 从随机位置开始选凭据（重启后不总是先打 0 号），失败后换下一个（index + 1 mod size），
//! 最多尝试 size 次；全部失败返回 ProviderExhausted。没有指数退避，池大小是唯一节流。
//! 每个 complete 调用内部串行尝试，同一时刻至多一个在途请求。

use std::sync::Arc;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::llm::{
    CompletionProvider, CredentialPool, GenerateRequest, LlmError, ProviderFailure,
};
use crate::transcript::Turn;

/// 失败后是否换凭据继续
///
/// 可重试失败（限流、配额、瞬时、格式异常）总是轮换；
/// `rotate_on_terminal` 决定其它失败（如 400）是否也轮换。默认 true：耗尽整个池再兜底。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    pub rotate_on_terminal: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            rotate_on_terminal: true,
        }
    }
}

impl RotationPolicy {
    pub fn should_rotate(&self, failure: &ProviderFailure) -> bool {
        failure.is_retryable() || self.rotate_on_terminal
    }
}

#[derive(Debug, Clone, Copy)]
enum StartIndex {
    Random,
    Fixed(usize),
}

/// 补全客户端：凭据池 + 提供方 + 轮换策略 + 采样参数
pub struct CompletionClient {
    pool: CredentialPool,
    provider: Arc<dyn CompletionProvider>,
    policy: RotationPolicy,
    temperature: f32,
    max_output_tokens: Option<u32>,
    start: StartIndex,
}

impl CompletionClient {
    pub fn new(pool: CredentialPool, provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            pool,
            provider,
            policy: RotationPolicy::default(),
            temperature: 0.7,
            max_output_tokens: None,
            start: StartIndex::Random,
        }
    }

    pub fn with_policy(mut self, policy: RotationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_output_tokens(mut self, max: Option<u32>) -> Self {
        self.max_output_tokens = max;
        self
    }

    /// 固定起始凭据（测试用，使轮换顺序可预测）
    pub fn with_start_index(mut self, index: usize) -> Self {
        self.start = StartIndex::Fixed(index);
        self
    }

    pub fn pool(&self) -> &CredentialPool {
        &self.pool
    }

    fn starting_index(&self) -> usize {
        match self.start {
            StartIndex::Random => rand::thread_rng().gen_range(0..self.pool.size()),
            StartIndex::Fixed(i) => i % self.pool.size(),
        }
    }

    /// 发送 history + prompt（作为最后一条 user），返回模型文本
    pub async fn complete(&self, prompt: &str, history: &[Turn]) -> Result<String, LlmError> {
        let mut contents = history.to_vec();
        contents.push(Turn::user(prompt));
        let request = GenerateRequest::new(contents, self.temperature)
            .with_max_output_tokens(self.max_output_tokens);

        let size = self.pool.size();
        let mut index = self.starting_index();
        let mut last_failure = None;

        for attempt in 1..=size {
            let credential = self.pool.get(index);
            debug!(attempt, credential_index = index, "Calling completion provider");
            match self.provider.generate(credential, &request).await {
                Ok(text) => {
                    if attempt > 1 {
                        info!(attempt, credential_index = index, "Completion succeeded after rotation");
                    }
                    return Ok(text);
                }
                Err(failure) => {
                    warn!(
                        attempt,
                        credential_index = index,
                        retryable = failure.is_retryable(),
                        "Completion attempt failed: {}",
                        failure
                    );
                    if !self.policy.should_rotate(&failure) {
                        return Err(LlmError::Terminal(failure));
                    }
                    index = (index + 1) % size;
                    if attempt < size {
                        debug!(credential_index = index, "Rotating to next credential");
                    }
                    last_failure = Some(failure);
                }
            }
        }

        warn!(attempts = size, "All credentials failed");
        Err(LlmError::ProviderExhausted {
            attempts: size,
            last_failure,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedProvider;

    fn pool(n: usize) -> CredentialPool {
        CredentialPool::from_csv(
            &(0..n).map(|i| format!("key{i}")).collect::<Vec<_>>().join(","),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_exhausts_exactly_pool_size_attempts() {
        let provider = Arc::new(ScriptedProvider::failing(ProviderFailure::RateLimited));
        let client = CompletionClient::new(pool(3), provider.clone());
        let err = client.complete("hello", &[]).await.unwrap_err();
        assert_eq!(provider.call_count(), 3);
        assert_eq!(
            err,
            LlmError::ProviderExhausted {
                attempts: 3,
                last_failure: Some(ProviderFailure::RateLimited),
            }
        );
    }

    #[tokio::test]
    async fn test_rotation_visits_every_credential_once() {
        let provider = Arc::new(ScriptedProvider::failing(ProviderFailure::QuotaExceeded));
        let client = CompletionClient::new(pool(4), provider.clone()).with_start_index(2);
        let _ = client.complete("hello", &[]).await;
        assert_eq!(provider.credentials_used(), vec!["key2", "key3", "key0", "key1"]);
    }

    #[tokio::test]
    async fn test_succeeds_on_second_credential() {
        let provider = Arc::new(ScriptedProvider::new([
            Err(ProviderFailure::Transient("connection reset".into())),
            Ok("Welcome.".to_string()),
        ]));
        let client = CompletionClient::new(pool(3), provider.clone()).with_start_index(0);
        let text = client.complete("hello", &[]).await.unwrap();
        assert_eq!(text, "Welcome.");
        assert_eq!(provider.credentials_used(), vec!["key0", "key1"]);
    }

    #[tokio::test]
    async fn test_terminal_failures_rotate_by_default() {
        let provider = Arc::new(ScriptedProvider::failing(ProviderFailure::Other { status: 400 }));
        let client = CompletionClient::new(pool(2), provider.clone());
        let err = client.complete("hello", &[]).await.unwrap_err();
        assert!(matches!(err, LlmError::ProviderExhausted { attempts: 2, .. }));
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_strict_policy_stops_on_terminal_failure() {
        let provider = Arc::new(ScriptedProvider::failing(ProviderFailure::Other { status: 400 }));
        let client = CompletionClient::new(pool(3), provider.clone()).with_policy(RotationPolicy {
            rotate_on_terminal: false,
        });
        let err = client.complete("hello", &[]).await.unwrap_err();
        assert_eq!(err, LlmError::Terminal(ProviderFailure::Other { status: 400 }));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_prompt_is_appended_as_final_user_turn() {
        let provider = Arc::new(ScriptedProvider::always("ok"));
        let client = CompletionClient::new(pool(1), provider.clone())
            .with_temperature(0.3)
            .with_max_output_tokens(Some(64));
        let history = vec![Turn::assistant("Welcome. Ready?")];
        client.complete("Ready", &history).await.unwrap();

        let request = provider.last_request().unwrap();
        assert_eq!(request.contents, vec![Turn::assistant("Welcome. Ready?"), Turn::user("Ready")]);
        assert_eq!(request.temperature, 0.3);
        assert_eq!(request.max_output_tokens, Some(64));
    }
}
