//! 会话层错误类型
//!
//! 远程模型故障不会越过 CompletionClient / EmotionClassifier 的边界（总有兜底）；
//! 这里只描述调用方可见的本地错误：配置错误、非法的 ScriptConfig 或历史。

use thiserror::Error;

/// 启动期配置错误（凭据池为空、配置文件无法解析）
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Credential pool is empty")]
    EmptyCredentialPool,

    #[error("Config load failed: {0}")]
    Load(#[from] config::ConfigError),
}

/// next_turn 向调用方报告的错误；与远程模型故障严格区分
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Invalid script config: {0}")]
    InvalidScript(String),

    #[error("Invalid history: {0}")]
    InvalidHistory(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}
