//! 情绪标签：封闭集合，默认 neutral，永不为空

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Calm,
    Anxious,
    Sad,
    Overwhelmed,
    #[default]
    Neutral,
}

impl EmotionLabel {
    pub const ALL: [EmotionLabel; 5] = [
        EmotionLabel::Calm,
        EmotionLabel::Anxious,
        EmotionLabel::Sad,
        EmotionLabel::Overwhelmed,
        EmotionLabel::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionLabel::Calm => "calm",
            EmotionLabel::Anxious => "anxious",
            EmotionLabel::Sad => "sad",
            EmotionLabel::Overwhelmed => "overwhelmed",
            EmotionLabel::Neutral => "neutral",
        }
    }

    /// 模型输出 trim + 小写后必须恰好等于某个标签
    pub fn from_model_output(raw: &str) -> Option<EmotionLabel> {
        raw.trim().to_lowercase().parse().ok()
    }
}

impl FromStr for EmotionLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EmotionLabel::ALL
            .into_iter()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| format!("unknown emotion label: {s}"))
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_output_must_be_exact_label() {
        assert_eq!(EmotionLabel::from_model_output(" Calm\n"), Some(EmotionLabel::Calm));
        assert_eq!(EmotionLabel::from_model_output("ANXIOUS"), Some(EmotionLabel::Anxious));
        assert_eq!(EmotionLabel::from_model_output("calm."), None);
        assert_eq!(EmotionLabel::from_model_output("I think sad"), None);
        assert_eq!(EmotionLabel::from_model_output(""), None);
    }

    #[test]
    fn test_default_is_neutral() {
        assert_eq!(EmotionLabel::default(), EmotionLabel::Neutral);
    }
}
