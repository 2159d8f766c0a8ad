//! 会话脚本：技术解析、本地兜底脚本、课程目录与 ScriptConfig

pub mod fallback;
pub mod program;
pub mod technique;

pub use fallback::{FallbackScriptEngine, TechniqueScript, SCRIPT_VERSION};
pub use program::{Program, ProgramDay, ScriptConfig, INTERACTION_PROTOCOL};
pub use technique::Technique;
