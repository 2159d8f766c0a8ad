//! 凭据池：启动时加载一次，之后只读，无需同步

use std::fmt;
use std::sync::Arc;

use crate::core::ConfigurationError;

/// 不透明的授权令牌；Debug 输出不泄露内容
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// 有序凭据集合；clone 只复制 Arc
#[derive(Clone, Debug)]
pub struct CredentialPool {
    credentials: Arc<[Credential]>,
}

impl CredentialPool {
    /// 空池是配置错误，启动时立即失败
    pub fn new(credentials: Vec<Credential>) -> Result<Self, ConfigurationError> {
        if credentials.is_empty() {
            return Err(ConfigurationError::EmptyCredentialPool);
        }
        Ok(Self {
            credentials: credentials.into(),
        })
    }

    /// 逗号分隔的令牌列表（如 `GEMINI_API_KEYS=a,b,c`），空白项被忽略
    pub fn from_csv(raw: &str) -> Result<Self, ConfigurationError> {
        Self::new(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(Credential::new)
                .collect(),
        )
    }

    pub fn size(&self) -> usize {
        self.credentials.len()
    }

    /// index 对 size 取模
    pub fn get(&self, index: usize) -> &Credential {
        &self.credentials[index % self.credentials.len()]
    }

    pub fn first(&self) -> &Credential {
        &self.credentials[0]
    }
}
