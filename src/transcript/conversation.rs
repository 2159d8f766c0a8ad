//! 对话历史与 transcript 组装
//!
//! 历史由调用方持有并按值传入；核心只读取、不持久化。
//! 模型接口没有独立的 system 通道，指令通过开头一对「user/assistant」脚本化交换注入。

use serde::{Deserialize, Serialize};

/// 会话开始时发送给模型的首个提示
pub const SESSION_START_PROMPT: &str = "The user has joined. Please greet them and start Step 1.";

/// 指令前导中 assistant 一侧的固定应答
pub const PREAMBLE_ACK: &str =
    "Understood. I am ready to guide the user through this mindfulness session.";

/// 消息角色（只有 user / assistant 两种）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// 单条对话
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// 有序、只追加的对话历史
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct History {
    turns: Vec<Turn>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl From<Vec<Turn>> for History {
    fn from(turns: Vec<Turn>) -> Self {
        Self { turns }
    }
}

/// 组装发往模型的历史：可选指令前导（user + assistant 一对）+ 真实历史。
/// 新提示由 CompletionClient 作为最后一条 user 追加，这里不包含。
pub fn build_transcript(instructions: Option<&str>, history: &[Turn]) -> Vec<Turn> {
    let mut out = Vec::with_capacity(history.len() + 2);
    if let Some(text) = instructions.map(str::trim).filter(|s| !s.is_empty()) {
        out.push(Turn::user(format!(
            "SYSTEM INSTRUCTIONS: {text}\n\nPlease start the session now by welcoming the user."
        )));
        out.push(Turn::assistant(PREAMBLE_ACK));
    }
    out.extend_from_slice(history);
    out
}
