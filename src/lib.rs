//! Mindful - 正念会话对话引擎
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 会话编排、会话状态机、引擎构建、错误类型
//! - **emotion**: 情绪分类（远程单词分类 + 关键词兜底）与会话情绪上下文
//! - **llm**: 凭据池、提供方抽象与实现（Gemini / Mock）、带轮换的补全客户端
//! - **observability**: tracing 初始化
//! - **protocol**: assistant 文本中的停顿 / 交互组件 / 结束标记解析
//! - **script**: 技术解析、本地兜底脚本、课程目录
//! - **transcript**: Turn / Role 与发往模型的 transcript 组装

pub mod config;
pub mod core;
pub mod emotion;
pub mod llm;
pub mod observability;
pub mod protocol;
pub mod script;
pub mod transcript;

pub use crate::core::{Engine, EngineBuilder, Session, SessionOrchestrator, TurnOutcome};
pub use emotion::{EmotionClassifier, EmotionLabel};
pub use protocol::{parse, Segment};
pub use script::{ScriptConfig, Technique};
