//! 关键词兜底：按固定优先级依次匹配，首个命中的组胜出，无命中为 neutral

use std::sync::OnceLock;

use regex::Regex;

use crate::emotion::EmotionLabel;

/// 顺序即优先级
const GROUPS: &[(EmotionLabel, &str)] = &[
    (
        EmotionLabel::Anxious,
        r"anxious|anxiety|worry|worried|nervous|stressed|panic|scared|afraid|tense|restless|fomo",
    ),
    (
        EmotionLabel::Sad,
        r"sad|down|upset|lonely|depressed|hopeless|cry|tears|empty|hollow|disappointed",
    ),
    (
        EmotionLabel::Overwhelmed,
        r"overwhelmed|too much|exhausted|burnout|burned out|can't cope|cannot cope|drowning|flooded|overloaded",
    ),
    (
        EmotionLabel::Calm,
        r"calm|peaceful|relaxed|serene|tranquil|settled|grounded|better|lighter|at ease",
    ),
];

static PATTERNS: OnceLock<Vec<(EmotionLabel, Regex)>> = OnceLock::new();

fn patterns() -> &'static [(EmotionLabel, Regex)] {
    PATTERNS.get_or_init(|| {
        GROUPS
            .iter()
            .map(|(label, pattern)| (*label, Regex::new(&format!("(?i){pattern}")).unwrap()))
            .collect()
    })
}

pub fn keyword_label(text: &str) -> EmotionLabel {
    patterns()
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(label, _)| *label)
        .unwrap_or_default()
}
