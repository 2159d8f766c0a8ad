//! LLM 层：凭据池、提供方抽象与实现（Gemini / Mock）、带轮换的补全客户端

pub mod client;
pub mod credentials;
pub mod gemini;
pub mod mock;
pub mod traits;

pub use client::{CompletionClient, RotationPolicy};
pub use credentials::{Credential, CredentialPool};
pub use gemini::{GeminiProvider, GEMINI_BASE_URL, GEMINI_FLASH, GEMINI_PRO};
pub use mock::ScriptedProvider;
pub use traits::{CompletionProvider, GenerateRequest, LlmError, ProviderFailure};
