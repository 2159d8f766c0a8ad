//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `MINDFUL__*` 覆盖（双下划线表示嵌套，如 `MINDFUL__LLM__MODEL=gemini-2.0-flash`）。
//! 凭据：`[llm] api_keys` 为空时读取逗号分隔的 `GEMINI_API_KEYS`。

use std::path::PathBuf;

use serde::Deserialize;

use crate::core::ConfigurationError;
use crate::llm::{CredentialPool, GEMINI_FLASH, GEMINI_PRO};

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LlmSection,
    pub emotion: EmotionSection,
    pub session: SessionSection,
}

/// [llm] 段：凭据、端点、模型与采样参数
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub api_keys: Vec<String>,
    pub base_url: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: Option<u32>,
    /// 单次请求超时（秒）
    pub timeout_secs: u64,
    /// 非可重试失败（如 400）是否也换下一个凭据
    pub rotate_on_terminal: bool,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            api_keys: Vec::new(),
            base_url: None,
            model: GEMINI_PRO.to_string(),
            temperature: 0.7,
            max_output_tokens: None,
            timeout_secs: 60,
            rotate_on_terminal: true,
        }
    }
}

/// [emotion] 段：轻量分类模型
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmotionSection {
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub max_input_chars: usize,
    pub timeout_secs: u64,
}

impl Default for EmotionSection {
    fn default() -> Self {
        Self {
            model: GEMINI_FLASH.to_string(),
            temperature: 0.1,
            max_output_tokens: 10,
            max_input_chars: 200,
            timeout_secs: 15,
        }
    }
}

/// [session] 段：终端默认课程与天数
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    pub program: String,
    pub day: u32,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            program: "5-day".to_string(),
            day: 1,
        }
    }
}

impl LlmSection {
    /// 配置中的 api_keys 优先，否则读 GEMINI_API_KEYS；都为空时返回 EmptyCredentialPool
    pub fn credential_pool(&self) -> Result<CredentialPool, ConfigurationError> {
        if !self.api_keys.is_empty() {
            return CredentialPool::from_csv(&self.api_keys.join(","));
        }
        let raw = std::env::var("GEMINI_API_KEYS").unwrap_or_default();
        CredentialPool::from_csv(&raw)
    }
}

/// 从 config 目录加载配置，环境变量 MINDFUL__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 MINDFUL__*（双下划线表示嵌套键；MINDFUL__LLM__API_KEYS 按逗号拆成列表）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, ConfigurationError> {
    load_config_with_env(config_path, None)
}

/// env 为 None 时读取进程环境变量；测试中传入固定映射
fn load_config_with_env(
    config_path: Option<PathBuf>,
    env: Option<config::Map<String, String>>,
) -> Result<AppConfig, ConfigurationError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("MINDFUL")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("llm.api_keys")
            .source(env),
    );

    let c = builder.build()?;
    Ok(c.try_deserialize()?)
}
