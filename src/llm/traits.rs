//! 模型提供方抽象
//!
//! CompletionProvider 只负责「用一个凭据发一次请求」；轮换与重试由 CompletionClient 负责。
//! 失败带可重试提示（限流 / 配额 / 瞬时网络 / 格式异常 / 其它）。

use async_trait::async_trait;
use thiserror::Error;

use crate::llm::Credential;
use crate::transcript::Turn;

/// 单次生成请求：完整 transcript（最后一条为新的 user 提示）+ 采样参数
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub contents: Vec<Turn>,
    pub temperature: f32,
    pub max_output_tokens: Option<u32>,
}

impl GenerateRequest {
    pub fn new(contents: Vec<Turn>, temperature: f32) -> Self {
        Self {
            contents,
            temperature,
            max_output_tokens: None,
        }
    }

    pub fn with_max_output_tokens(mut self, max: Option<u32>) -> Self {
        self.max_output_tokens = max;
        self
    }
}

/// 单次调用失败的分类
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderFailure {
    #[error("Rate limited")]
    RateLimited,

    #[error("Quota exceeded")]
    QuotaExceeded,

    #[error("Transient network fault: {0}")]
    Transient(String),

    /// 响应缺少期望字段；与可重试失败同等对待
    #[error("Malformed provider response: {0}")]
    Malformed(String),

    #[error("Provider returned HTTP {status}")]
    Other { status: u16 },
}

impl ProviderFailure {
    /// 换一个凭据是否有望成功
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ProviderFailure::Other { .. })
    }
}

/// CompletionClient 向上层报告的错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// 所有凭据都试过且失败，或根本没有配置凭据（attempts = 0）
    #[error("Provider exhausted after {attempts} attempt(s)")]
    ProviderExhausted {
        attempts: usize,
        last_failure: Option<ProviderFailure>,
    },

    /// 轮换策略判定为终止性失败，提前停止
    #[error("Terminal provider failure: {0}")]
    Terminal(ProviderFailure),
}

/// 模型提供方：用给定凭据完成一次生成
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn generate(
        &self,
        credential: &Credential,
        request: &GenerateRequest,
    ) -> Result<String, ProviderFailure>;
}
