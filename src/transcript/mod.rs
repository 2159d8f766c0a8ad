//! 对话记录：Turn / Role 与发往模型的完整 transcript 组装

pub mod conversation;

pub use conversation::{
    build_transcript, History, Role, Turn, PREAMBLE_ACK, SESSION_START_PROMPT,
};
