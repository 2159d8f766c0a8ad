//! 情绪分类：标签、关键词兜底、分类器与会话情绪上下文

pub mod classifier;
pub mod context;
pub mod keywords;
pub mod label;

pub use classifier::{Classification, ClassificationSource, ClassifierSettings, EmotionClassifier};
pub use context::EmotionContext;
pub use keywords::keyword_label;
pub use label::EmotionLabel;
