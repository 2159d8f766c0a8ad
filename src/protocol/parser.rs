//! 内容协议解析：assistant 文本 → 有序片段 + 是否结束
//!
//! 语法（大小写不敏感）：
//! - `[Pause N seconds]` / `[Pause N second]` → TimedPause(N, "Mindful Pause")
//! - `[OBSERVE_PHONE]` → Widget(PhoneObservation)
//! - `[SOBER_PRACTICE]` → Widget(SoberPractice)
//! - `[SESSION_COMPLETE]` → is_complete = true，从文本中整体删除，不产生片段
//!
//! 各类标记分别匹配后按起始位置合并排序；与前一个标记重叠的匹配被丢弃。
//! 不完整或非法的标记（如缺右括号的 `[Pause`、`[Pause 0 seconds]`）原样保留为文本。
//! 紧邻标记一侧的空白会被裁掉，纯空白的文本段不输出。

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const PAUSE_LABEL: &str = "Mindful Pause";

static PAUSE_RE: OnceLock<Regex> = OnceLock::new();
static OBSERVE_PHONE_RE: OnceLock<Regex> = OnceLock::new();
static SOBER_PRACTICE_RE: OnceLock<Regex> = OnceLock::new();
static COMPLETE_RE: OnceLock<Regex> = OnceLock::new();

fn pause_re() -> &'static Regex {
    PAUSE_RE.get_or_init(|| Regex::new(r"(?i)\[pause\s+(\d+)\s+seconds?\]").unwrap())
}

fn observe_phone_re() -> &'static Regex {
    OBSERVE_PHONE_RE.get_or_init(|| Regex::new(r"(?i)\[observe_phone\]").unwrap())
}

fn sober_practice_re() -> &'static Regex {
    SOBER_PRACTICE_RE.get_or_init(|| Regex::new(r"(?i)\[sober_practice\]").unwrap())
}

fn complete_re() -> &'static Regex {
    COMPLETE_RE.get_or_init(|| Regex::new(r"(?i)\[session_complete\]").unwrap())
}

/// 交互组件种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetKind {
    PhoneObservation,
    SoberPractice,
}

/// 展示层消费的片段；创建后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    Text { content: String },
    TimedPause { seconds: u32, label: String },
    Widget { kind: WidgetKind },
}

impl Segment {
    pub fn text(content: impl Into<String>) -> Self {
        Segment::Text {
            content: content.into(),
        }
    }

    pub fn pause(seconds: u32) -> Self {
        Segment::TimedPause {
            seconds,
            label: PAUSE_LABEL.to_string(),
        }
    }

    pub fn widget(kind: WidgetKind) -> Self {
        Segment::Widget { kind }
    }
}

/// 解析结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTurn {
    pub segments: Vec<Segment>,
    pub is_complete: bool,
    /// 去掉结束标记后的文本（其它标记保留），用于写回历史
    pub text: String,
}

/// 去掉所有结束标记；命中时整体 trim
pub fn strip_completion(text: &str) -> (String, bool) {
    let re = complete_re();
    if re.is_match(text) {
        (re.replace_all(text, "").trim().to_string(), true)
    } else {
        (text.to_string(), false)
    }
}

struct Marker {
    start: usize,
    end: usize,
    segment: Segment,
}

fn find_markers(text: &str) -> Vec<Marker> {
    let mut markers = Vec::new();
    for caps in pause_re().captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let seconds = caps
            .get(1)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .filter(|s| *s > 0);
        if let Some(seconds) = seconds {
            markers.push(Marker {
                start: whole.start(),
                end: whole.end(),
                segment: Segment::pause(seconds),
            });
        }
    }
    for (re, kind) in [
        (observe_phone_re(), WidgetKind::PhoneObservation),
        (sober_practice_re(), WidgetKind::SoberPractice),
    ] {
        for m in re.find_iter(text) {
            markers.push(Marker {
                start: m.start(),
                end: m.end(),
                segment: Segment::widget(kind),
            });
        }
    }
    markers.sort_by_key(|m| m.start);
    markers
}

/// 解析 assistant 文本
pub fn parse(raw: &str) -> ParsedTurn {
    let (text, is_complete) = strip_completion(raw);
    let markers = find_markers(&text);

    if markers.is_empty() {
        let segments = if is_complete && text.is_empty() {
            Vec::new()
        } else {
            vec![Segment::text(text.clone())]
        };
        return ParsedTurn {
            segments,
            is_complete,
            text,
        };
    }

    let mut segments = Vec::with_capacity(markers.len() * 2 + 1);
    let mut cursor = 0;
    for marker in markers {
        if marker.start < cursor {
            continue;
        }
        let mut span = text[cursor..marker.start].trim_end();
        if cursor > 0 {
            span = span.trim_start();
        }
        if !span.is_empty() {
            segments.push(Segment::text(span));
        }
        segments.push(marker.segment);
        cursor = marker.end;
    }
    let tail = text[cursor..].trim_start();
    if !tail.is_empty() {
        segments.push(Segment::text(tail));
    }

    ParsedTurn {
        segments,
        is_complete,
        text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_single_segment() {
        let input = "Notice where your body meets the chair.\nLet me know when you're ready.";
        let parsed = parse(input);
        assert_eq!(parsed.segments, vec![Segment::text(input)]);
        assert!(!parsed.is_complete);
    }

    #[test]
    fn test_completion_marker_is_stripped() {
        let parsed = parse("Good job. [SESSION_COMPLETE]");
        assert_eq!(parsed.segments, vec![Segment::text("Good job.")]);
        assert!(parsed.is_complete);
        assert_eq!(parsed.text, "Good job.");
    }

    #[test]
    fn test_completion_marker_case_insensitive_and_anywhere() {
        let parsed = parse("[session_complete]\nWell done.");
        assert!(parsed.is_complete);
        assert_eq!(parsed.segments, vec![Segment::text("Well done.")]);

        let parsed = parse("[SESSION_COMPLETE]");
        assert!(parsed.is_complete);
        assert!(parsed.segments.is_empty());
    }

    #[test]
    fn test_pause_between_text() {
        let parsed = parse("Relax.\n[Pause 10 seconds]\nContinue.");
        assert_eq!(
            parsed.segments,
            vec![
                Segment::text("Relax."),
                Segment::pause(10),
                Segment::text("Continue."),
            ]
        );
        assert!(!parsed.is_complete);
    }

    #[test]
    fn test_singular_and_lowercase_pause() {
        let parsed = parse("[pause 1 second]");
        assert_eq!(parsed.segments, vec![Segment::pause(1)]);
    }

    #[test]
    fn test_widgets_keep_left_to_right_order() {
        let parsed = parse(
            "Hold it.\n\n[OBSERVE_PHONE]\n\nThen [Pause 5 seconds] and [sober_practice] done",
        );
        assert_eq!(
            parsed.segments,
            vec![
                Segment::text("Hold it."),
                Segment::widget(WidgetKind::PhoneObservation),
                Segment::text("Then"),
                Segment::pause(5),
                Segment::text("and"),
                Segment::widget(WidgetKind::SoberPractice),
                Segment::text("done"),
            ]
        );
    }

    #[test]
    fn test_marker_text_never_leaks_into_segments() {
        let parsed = parse("Breathe. [Pause 15 seconds] Excellent! [SESSION_COMPLETE]");
        assert!(parsed.is_complete);
        for seg in &parsed.segments {
            if let Segment::Text { content } = seg {
                assert!(!content.contains("SESSION_COMPLETE"));
                assert!(!content.contains("[Pause"));
            }
        }
    }

    #[test]
    fn test_malformed_markers_stay_text() {
        let input = "Wait [Pause 10 seconds and [Pause 0 seconds] [Pause x seconds]";
        let parsed = parse(input);
        assert_eq!(parsed.segments, vec![Segment::text(input)]);
    }

    #[test]
    fn test_segment_serialization_is_tagged() {
        let json = serde_json::to_value(Segment::pause(8)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "timed_pause", "seconds": 8, "label": "Mindful Pause"})
        );
        let json = serde_json::to_value(Segment::widget(WidgetKind::PhoneObservation)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "widget", "kind": "phone-observation"}));
    }
}
