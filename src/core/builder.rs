//! 引擎构建器：从 AppConfig 组装编排器与情绪分类器
//!
//! 凭据池为空不是致命错误：记录警告后以离线模式运行，所有回合来自本地脚本，分类只用关键词。

use std::sync::Arc;

use crate::config::AppConfig;
use crate::core::SessionOrchestrator;
use crate::emotion::{ClassifierSettings, EmotionClassifier};
use crate::llm::{CompletionClient, CredentialPool, GeminiProvider, RotationPolicy};

/// 对外入口：回合生成 + 情绪分类，两者相互独立
pub struct Engine {
    pub orchestrator: SessionOrchestrator,
    pub classifier: EmotionClassifier,
}

/// 引擎构建器
pub struct EngineBuilder {
    config: AppConfig,
    pool: Option<CredentialPool>,
}

impl EngineBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self { config, pool: None }
    }

    /// 直接指定凭据池（跳过配置与环境变量）
    pub fn with_pool(mut self, pool: CredentialPool) -> Self {
        self.pool = Some(pool);
        self
    }

    /// 不读取任何凭据，强制离线
    pub fn build_offline(self) -> Engine {
        Engine {
            orchestrator: SessionOrchestrator::offline(),
            classifier: EmotionClassifier::keyword_only(),
        }
    }

    pub fn build(mut self) -> Engine {
        let pool = match self.pool.take() {
            Some(pool) => Some(pool),
            None => match self.config.llm.credential_pool() {
                Ok(pool) => Some(pool),
                Err(e) => {
                    tracing::warn!("{}; running offline with scripted fallback", e);
                    None
                }
            },
        };

        let Some(pool) = pool else {
            return self.build_offline();
        };

        let llm = &self.config.llm;
        let base_url = llm.base_url.as_deref();
        tracing::info!(model = %llm.model, credentials = pool.size(), "Using Gemini provider");

        let provider = Arc::new(GeminiProvider::new(base_url, &llm.model, llm.timeout_secs));
        let completion = CompletionClient::new(pool.clone(), provider)
            .with_temperature(llm.temperature)
            .with_max_output_tokens(llm.max_output_tokens)
            .with_policy(RotationPolicy {
                rotate_on_terminal: llm.rotate_on_terminal,
            });

        let emotion = &self.config.emotion;
        let emotion_provider = Arc::new(GeminiProvider::new(
            base_url,
            &emotion.model,
            emotion.timeout_secs,
        ));
        let classifier = EmotionClassifier::new(emotion_provider, pool.first().clone())
            .with_settings(ClassifierSettings {
                temperature: emotion.temperature,
                max_output_tokens: emotion.max_output_tokens,
                max_input_chars: emotion.max_input_chars,
            });

        Engine {
            orchestrator: SessionOrchestrator::new(completion),
            classifier,
        }
    }
}
