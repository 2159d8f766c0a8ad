//! 会话编排器：回答「下一句 assistant 说什么」
//!
//! 流程：组装 transcript（指令前导 + 历史）→ CompletionClient.complete →
//! 失败时改用 FallbackScriptEngine.step(技术, 历史条数) → ContentProtocolParser.parse → 返回片段与结束标志。
//! 兜底只在这里触发，兜底本身从不调用远程模型。使用了哪条路径只作为观测信息返回，不影响后续决策。

use serde::Serialize;
use tracing::{info, warn};

use crate::core::SessionError;
use crate::llm::CompletionClient;
use crate::protocol::{parse, Segment};
use crate::script::{FallbackScriptEngine, ScriptConfig};
use crate::transcript::{build_transcript, Role, Turn, SESSION_START_PROMPT};

/// 回合文本来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnSource {
    Remote,
    Fallback,
}

/// next_turn 的结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnOutcome {
    pub segments: Vec<Segment>,
    pub is_complete: bool,
    /// 去掉结束标记后的回复文本，调用方写入历史用
    pub reply: String,
    pub source: TurnSource,
}

impl TurnOutcome {
    pub fn used_fallback(&self) -> bool {
        self.source == TurnSource::Fallback
    }
}

/// 编排器：completion 为 None 时处于离线模式，每一轮都直接走兜底脚本
pub struct SessionOrchestrator {
    completion: Option<CompletionClient>,
}

impl SessionOrchestrator {
    pub fn new(completion: CompletionClient) -> Self {
        Self {
            completion: Some(completion),
        }
    }

    pub fn offline() -> Self {
        Self { completion: None }
    }

    pub fn is_offline(&self) -> bool {
        self.completion.is_none()
    }

    /// 生成下一句 assistant 回复
    ///
    /// - history 为空：会话开始，提示为 SESSION_START_PROMPT
    /// - 否则最后一条必须是用户的新输入，它作为提示，之前的部分作为历史
    pub async fn next_turn(
        &self,
        history: &[Turn],
        script: &ScriptConfig,
    ) -> Result<TurnOutcome, SessionError> {
        script.validate()?;

        let (prompt, prior) = match history.split_last() {
            None => (SESSION_START_PROMPT, history),
            Some((last, prior)) if last.role == Role::User => (last.content.as_str(), prior),
            Some(_) => {
                return Err(SessionError::InvalidHistory(
                    "last turn must be the user's new message".to_string(),
                ))
            }
        };

        let technique = script.resolved_technique();
        let (raw, source) = match &self.completion {
            Some(client) => {
                let transcript = build_transcript(Some(&script.instructions), prior);
                match client.complete(prompt, &transcript).await {
                    Ok(text) => (text, TurnSource::Remote),
                    Err(e) => {
                        warn!(%technique, turn_count = prior.len(), "Provider unavailable, using fallback script: {}", e);
                        (
                            FallbackScriptEngine::step(technique, prior.len()).to_string(),
                            TurnSource::Fallback,
                        )
                    }
                }
            }
            None => (
                FallbackScriptEngine::step(technique, prior.len()).to_string(),
                TurnSource::Fallback,
            ),
        };

        let parsed = parse(&raw);
        if parsed.is_complete {
            info!(%technique, ?source, "Session reached completion marker");
        }
        Ok(TurnOutcome {
            segments: parsed.segments,
            is_complete: parsed.is_complete,
            reply: parsed.text,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::llm::{CredentialPool, ProviderFailure, ScriptedProvider};
    use crate::script::Technique;

    fn online(provider: Arc<ScriptedProvider>, keys: &str) -> SessionOrchestrator {
        SessionOrchestrator::new(
            CompletionClient::new(CredentialPool::from_csv(keys).unwrap(), provider)
                .with_start_index(0),
        )
    }

    fn sober() -> ScriptConfig {
        ScriptConfig::for_program("5-day", 3).unwrap()
    }

    #[tokio::test]
    async fn test_offline_start_returns_opening_line() {
        let orchestrator = SessionOrchestrator::offline();
        let outcome = orchestrator.next_turn(&[], &sober()).await.unwrap();
        let opening = FallbackScriptEngine::step(Technique::Sober, 0);
        assert_eq!(outcome.segments, parse(opening).segments);
        assert!(!outcome.is_complete);
        assert!(outcome.used_fallback());
    }

    #[tokio::test]
    async fn test_remote_reply_is_parsed() {
        let provider = Arc::new(ScriptedProvider::always(
            "Breathe in.\n[Pause 5 seconds]\nWell done. [SESSION_COMPLETE]",
        ));
        let orchestrator = online(provider.clone(), "k1");
        let history = vec![Turn::assistant("Welcome. Ready?"), Turn::user("Ready")];
        let outcome = orchestrator.next_turn(&history, &sober()).await.unwrap();

        assert_eq!(outcome.source, TurnSource::Remote);
        assert!(outcome.is_complete);
        assert_eq!(outcome.reply, "Breathe in.\n[Pause 5 seconds]\nWell done.");
        assert_eq!(outcome.segments.len(), 3);

        // 前导一对 + 开场 + 新提示
        let request = provider.last_request().unwrap();
        assert_eq!(request.contents.len(), 4);
        assert!(request.contents[0].content.starts_with("SYSTEM INSTRUCTIONS:"));
        assert_eq!(request.contents[2], Turn::assistant("Welcome. Ready?"));
        assert_eq!(request.contents[3], Turn::user("Ready"));
    }

    #[tokio::test]
    async fn test_exhaustion_falls_back_with_prior_turn_count() {
        let provider = Arc::new(ScriptedProvider::failing(ProviderFailure::RateLimited));
        let orchestrator = online(provider.clone(), "a,b");
        let history = vec![
            Turn::assistant("opening"),
            Turn::user("ok"),
            Turn::assistant("step"),
            Turn::user("done"),
        ];
        let outcome = orchestrator.next_turn(&history, &sober()).await.unwrap();
        assert_eq!(provider.call_count(), 2);
        assert!(outcome.used_fallback());
        assert_eq!(
            outcome.reply,
            parse(FallbackScriptEngine::step(Technique::Sober, 3)).text
        );
    }

    #[tokio::test]
    async fn test_start_uses_session_start_prompt() {
        let provider = Arc::new(ScriptedProvider::always("Welcome."));
        let orchestrator = online(provider.clone(), "k1");
        orchestrator.next_turn(&[], &sober()).await.unwrap();
        let request = provider.last_request().unwrap();
        assert_eq!(request.contents.last(), Some(&Turn::user(SESSION_START_PROMPT)));
    }

    #[tokio::test]
    async fn test_invalid_script_is_local_error() {
        let orchestrator = SessionOrchestrator::offline();
        let bad = ScriptConfig::new("SOBER", 4, 3);
        assert!(matches!(
            orchestrator.next_turn(&[], &bad).await,
            Err(SessionError::InvalidScript(_))
        ));
    }

    #[tokio::test]
    async fn test_history_must_end_with_user_turn() {
        let orchestrator = SessionOrchestrator::offline();
        let history = vec![Turn::assistant("Welcome.")];
        assert!(matches!(
            orchestrator.next_turn(&history, &sober()).await,
            Err(SessionError::InvalidHistory(_))
        ));
    }

    #[tokio::test]
    async fn test_extra_calls_after_completion_are_not_rejected() {
        let orchestrator = SessionOrchestrator::offline();
        let mut history = Vec::new();
        for i in 0..40 {
            history.push(Turn::assistant(format!("a{i}")));
            history.push(Turn::user(format!("u{i}")));
        }
        let outcome = orchestrator.next_turn(&history, &sober()).await.unwrap();
        assert!(outcome.is_complete);
    }
}
