//! 单个会话的状态机：NotStarted → InProgress → Completed
//!
//! Session 持有本次会话的历史与脚本配置，驱动 SessionOrchestrator。
//! 技术在创建时解析一次并固定下来。结果完整返回之前不修改任何状态，
//! 因此调用方可随时放弃（超时、离开页面）一个进行中的调用。

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::{SessionError, SessionOrchestrator, TurnOutcome};
use crate::script::{ScriptConfig, Technique};
use crate::transcript::{History, Role, Turn};

/// 会话阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    NotStarted,
    InProgress,
    /// 终态；之后的调用不被拒绝，只记录警告
    Completed,
}

/// 粗略估计的会话总消息数，用于进度条
const ESTIMATED_TOTAL_TURNS: f64 = 12.0;

pub struct Session {
    id: Uuid,
    script: ScriptConfig,
    history: History,
    state: SessionState,
    started_at: DateTime<Local>,
}

impl Session {
    pub fn new(script: ScriptConfig) -> Self {
        let technique = script.resolved_technique();
        Self {
            id: Uuid::new_v4(),
            script: script.with_technique(technique),
            history: History::new(),
            state: SessionState::NotStarted,
            started_at: Local::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn technique(&self) -> Technique {
        self.script.resolved_technique()
    }

    pub fn script(&self) -> &ScriptConfig {
        &self.script
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// 请求开场白
    pub async fn start(
        &mut self,
        orchestrator: &SessionOrchestrator,
    ) -> Result<TurnOutcome, SessionError> {
        if self.state != SessionState::NotStarted {
            return Err(SessionError::InvalidHistory(
                "session already started".to_string(),
            ));
        }
        let outcome = orchestrator.next_turn(&[], &self.script).await?;
        info!(session = %self.id, technique = %self.technique(), source = ?outcome.source, "Session started");
        self.state = SessionState::InProgress;
        self.record(None, &outcome);
        Ok(outcome)
    }

    /// 提交用户输入，得到下一句回复
    pub async fn respond(
        &mut self,
        orchestrator: &SessionOrchestrator,
        user_text: &str,
    ) -> Result<TurnOutcome, SessionError> {
        match self.state {
            SessionState::NotStarted => {
                return Err(SessionError::InvalidHistory(
                    "session not started".to_string(),
                ))
            }
            SessionState::Completed => {
                warn!(session = %self.id, "Turn requested after session completed");
            }
            SessionState::InProgress => {}
        }

        let mut turns = self.history.turns().to_vec();
        turns.push(Turn::user(user_text));
        let outcome = orchestrator.next_turn(&turns, &self.script).await?;

        self.record(Some(user_text), &outcome);
        Ok(outcome)
    }

    fn record(&mut self, user_text: Option<&str>, outcome: &TurnOutcome) {
        if let Some(text) = user_text {
            self.history.push(Turn::user(text));
        }
        self.history.push(Turn::assistant(outcome.reply.clone()));
        if outcome.is_complete && self.state != SessionState::Completed {
            info!(session = %self.id, turns = self.history.len(), "Session completed");
            self.state = SessionState::Completed;
        }
    }

    /// 完成时 100，否则按消息数估算，最高 90
    pub fn progress_percent(&self) -> u8 {
        if self.state == SessionState::Completed {
            return 100;
        }
        let ratio = (self.history.len() as f64 + 2.0) / ESTIMATED_TOTAL_TURNS;
        (ratio * 90.0).round().min(90.0) as u8
    }

    /// 导出为纯文本：`ROLE: content`，空行分隔
    pub fn export_transcript(&self) -> String {
        self.history
            .turns()
            .iter()
            .map(|t| {
                let role = match t.role {
                    Role::User => "USER",
                    Role::Assistant => "ASSISTANT",
                };
                format!("{role}: {}", t.content)
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn transcript_file_name(&self) -> String {
        format!(
            "mindful-session-day{}-{}.txt",
            self.script.day_index,
            self.started_at.format("%Y-%m-%d")
        )
    }
}
