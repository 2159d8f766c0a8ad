//! 练习技术（Technique）枚举与从自由文本指令的解析
//!
//! 解析只是字符串包含判断（区分大小写），不做语义理解。多个名称同时命中时取最长（最具体）的那个；
//! 长度相同按表中顺序取先出现者。每个会话只解析一次，结果写回 ScriptConfig。

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Technique {
    DigitalRaisin,
    Rain,
    Sober,
    UrgeSurfing,
    LeavesOnStream,
    /// 无匹配时的兜底脚本
    Generic,
}

/// (子串, 技术)；顺序决定同长度时的优先级
const NAME_TABLE: &[(&str, Technique)] = &[
    ("Digital Raisin", Technique::DigitalRaisin),
    ("Mindful Holding", Technique::DigitalRaisin),
    ("RAIN", Technique::Rain),
    ("SOBER", Technique::Sober),
    ("Urge Surfing", Technique::UrgeSurfing),
    ("Wave Metaphor", Technique::UrgeSurfing),
    ("Leaves on a Stream", Technique::LeavesOnStream),
];

impl Technique {
    pub const ALL: [Technique; 6] = [
        Technique::DigitalRaisin,
        Technique::Rain,
        Technique::Sober,
        Technique::UrgeSurfing,
        Technique::LeavesOnStream,
        Technique::Generic,
    ];

    /// 从指令文本解析技术；没有任何名称命中时返回 Generic
    pub fn resolve(instructions: &str) -> Technique {
        let mut best: Option<(&str, Technique)> = None;
        for &(name, technique) in NAME_TABLE {
            if !instructions.contains(name) {
                continue;
            }
            match best {
                Some((current, _)) if current.len() >= name.len() => {}
                _ => best = Some((name, technique)),
            }
        }
        best.map(|(_, t)| t).unwrap_or(Technique::Generic)
    }

    pub fn id(&self) -> &'static str {
        match self {
            Technique::DigitalRaisin => "digital-raisin",
            Technique::Rain => "rain",
            Technique::Sober => "sober",
            Technique::UrgeSurfing => "urge-surfing",
            Technique::LeavesOnStream => "leaves-on-stream",
            Technique::Generic => "generic",
        }
    }
}

impl fmt::Display for Technique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_single_names() {
        assert_eq!(Technique::resolve("Day 1: The Digital Raisin"), Technique::DigitalRaisin);
        assert_eq!(Technique::resolve("Mindful Holding practice"), Technique::DigitalRaisin);
        assert_eq!(Technique::resolve("Use RAIN for FOMO"), Technique::Rain);
        assert_eq!(Technique::resolve("The SOBER Breathing Space"), Technique::Sober);
        assert_eq!(Technique::resolve("The Wave Metaphor"), Technique::UrgeSurfing);
        assert_eq!(Technique::resolve("Leaves on a Stream"), Technique::LeavesOnStream);
    }

    #[test]
    fn test_resolve_is_case_sensitive() {
        assert_eq!(Technique::resolve("a train through the rain"), Technique::Generic);
        assert_eq!(Technique::resolve("stay sober"), Technique::Generic);
    }

    #[test]
    fn test_longest_name_wins() {
        let recap = "Leaves on a Stream. Recap: Digital Raisin, RAIN, SOBER, Urge Surfing.";
        assert_eq!(Technique::resolve(recap), Technique::LeavesOnStream);
        assert_eq!(Technique::resolve("Urge Surfing & RAIN"), Technique::UrgeSurfing);
    }

    #[test]
    fn test_no_match_is_generic() {
        assert_eq!(Technique::resolve(""), Technique::Generic);
        assert_eq!(Technique::resolve("Body scan"), Technique::Generic);
    }

    #[test]
    fn test_serde_uses_kebab_case_ids() {
        for t in Technique::ALL {
            assert_eq!(serde_json::to_string(&t).unwrap(), format!("\"{}\"", t.id()));
        }
    }
}
