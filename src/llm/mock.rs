//! Mock 提供方（用于测试，无需 API）
//!
//! 按顺序返回预设结果；预设用完后重复最后一个。记录每次调用使用的凭据与请求，便于断言轮换行为。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::{CompletionProvider, Credential, GenerateRequest, ProviderFailure};

/// 预设结果的 Mock 提供方
#[derive(Debug)]
pub struct ScriptedProvider {
    outcomes: Mutex<VecDeque<Result<String, ProviderFailure>>>,
    last: Result<String, ProviderFailure>,
    calls: Mutex<Vec<(String, GenerateRequest)>>,
}

impl ScriptedProvider {
    pub fn new(outcomes: impl IntoIterator<Item = Result<String, ProviderFailure>>) -> Self {
        let outcomes: VecDeque<_> = outcomes.into_iter().collect();
        let last = outcomes
            .back()
            .cloned()
            .unwrap_or(Err(ProviderFailure::Other { status: 500 }));
        Self {
            outcomes: Mutex::new(outcomes),
            last,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// 每次都返回同一段文本
    pub fn always(text: impl Into<String>) -> Self {
        Self::new([Ok(text.into())])
    }

    /// 每次都以同一原因失败
    pub fn failing(failure: ProviderFailure) -> Self {
        Self::new([Err(failure)])
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// 各次调用使用的凭据（按调用顺序）
    pub fn credentials_used(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|c| c.iter().map(|(k, _)| k.clone()).collect())
            .unwrap_or_default()
    }

    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.calls
            .lock()
            .ok()
            .and_then(|c| c.last().map(|(_, r)| r.clone()))
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn generate(
        &self,
        credential: &Credential,
        request: &GenerateRequest,
    ) -> Result<String, ProviderFailure> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((credential.expose().to_string(), request.clone()));
        }
        let next = self.outcomes.lock().ok().and_then(|mut q| q.pop_front());
        next.unwrap_or_else(|| self.last.clone())
    }
}
