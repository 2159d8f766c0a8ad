//! 核心编排层：错误类型、引擎构建、会话编排与会话状态机

pub mod builder;
pub mod error;
pub mod orchestrator;
pub mod session;

pub use builder::{Engine, EngineBuilder};
pub use error::{ConfigurationError, SessionError};
pub use orchestrator::{SessionOrchestrator, TurnOutcome, TurnSource};
pub use session::{Session, SessionState};
