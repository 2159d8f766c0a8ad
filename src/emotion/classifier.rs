//! 轻量情绪分类：远程单词分类为主，关键词匹配兜底
//!
//! 对外永不失败：过短输入直接 neutral；远程调用任何故障（网络、非 2xx、没有凭据）都退回关键词匹配；
//! 远程输出不是五个标签之一时记为 neutral。与回合生成相互独立，可并行调用。

use std::sync::Arc;

use tracing::{debug, warn};

use crate::emotion::{keyword_label, EmotionLabel};
use crate::llm::{CompletionProvider, Credential, GenerateRequest};
use crate::transcript::Turn;

const EMOTION_PROMPT: &str = r#"You are an emotion classifier for a mindfulness app. Your job is to detect the user's current emotional TONE (not content accuracy) to guide background visuals.

RULES:
1. Output ONLY one word from: calm, anxious, sad, overwhelmed, neutral
2. No explanation, no punctuation, just the single word
3. Default to "neutral" if unclear
4. This is for ambient visuals only, not diagnosis

LABELS:
- calm: stable, peaceful, relaxed, content, at ease
- anxious: worried, tense, nervous, stressed, restless, FOMO
- sad: down, low energy, disappointed, lonely, discouraged
- overwhelmed: flooded, too much, can't cope, burned out
- neutral: factual, unclear, mixed, or no strong emotion

User message: "{USER_MESSAGE}"

Emotion:"#;

/// 结果来源，仅用于观测
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationSource {
    /// 输入过短，未做任何匹配
    Skipped,
    Llm,
    Keyword,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub label: EmotionLabel,
    pub source: ClassificationSource,
}

/// 远程分类参数
#[derive(Debug, Clone, Copy)]
pub struct ClassifierSettings {
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub max_input_chars: usize,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_output_tokens: 10,
            max_input_chars: 200,
        }
    }
}

/// 情绪分类器；remote 为 None 时只用关键词
pub struct EmotionClassifier {
    remote: Option<(Arc<dyn CompletionProvider>, Credential)>,
    settings: ClassifierSettings,
}

impl EmotionClassifier {
    pub fn new(provider: Arc<dyn CompletionProvider>, credential: Credential) -> Self {
        Self {
            remote: Some((provider, credential)),
            settings: ClassifierSettings::default(),
        }
    }

    pub fn keyword_only() -> Self {
        Self {
            remote: None,
            settings: ClassifierSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: ClassifierSettings) -> Self {
        self.settings = settings;
        self
    }

    pub async fn classify(&self, utterance: &str) -> EmotionLabel {
        self.classify_detailed(utterance).await.label
    }

    pub async fn classify_detailed(&self, utterance: &str) -> Classification {
        if utterance.trim().chars().count() < 2 {
            return Classification {
                label: EmotionLabel::Neutral,
                source: ClassificationSource::Skipped,
            };
        }

        let Some((provider, credential)) = &self.remote else {
            return keyword_classification(utterance);
        };

        let truncated: String = utterance.chars().take(self.settings.max_input_chars).collect();
        let request = GenerateRequest::new(
            vec![Turn::user(EMOTION_PROMPT.replace("{USER_MESSAGE}", &truncated))],
            self.settings.temperature,
        )
        .with_max_output_tokens(Some(self.settings.max_output_tokens));

        match provider.generate(credential, &request).await {
            Ok(raw) => {
                let label = EmotionLabel::from_model_output(&raw).unwrap_or_default();
                debug!(%label, "Emotion classified by model");
                Classification {
                    label,
                    source: ClassificationSource::Llm,
                }
            }
            Err(failure) => {
                warn!("Emotion classification failed, using keyword fallback: {}", failure);
                keyword_classification(utterance)
            }
        }
    }
}

fn keyword_classification(utterance: &str) -> Classification {
    let label = keyword_label(utterance);
    debug!(%label, "Emotion classified by keywords");
    Classification {
        label,
        source: ClassificationSource::Keyword,
    }
}
