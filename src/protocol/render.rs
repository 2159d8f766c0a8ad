//! 展示辅助：文本片段按行拆段、`**...**` 强调拆分
//!
//! 这属于展示层约定而非协议本身，放在这里供终端与其它前端共用。

use std::sync::OnceLock;

use regex::Regex;

static EMPHASIS_RE: OnceLock<Regex> = OnceLock::new();

/// 行内片段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span<'a> {
    Plain(&'a str),
    Strong(&'a str),
}

/// 每一行是一个段落
pub fn paragraphs(text: &str) -> Vec<&str> {
    text.split('\n').collect()
}

/// 拆出 `**粗体**`；不成对的星号按普通文本处理
pub fn emphasis_spans(line: &str) -> Vec<Span<'_>> {
    let re = EMPHASIS_RE.get_or_init(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
    let mut spans = Vec::new();
    let mut cursor = 0;
    for caps in re.captures_iter(line) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > cursor {
            spans.push(Span::Plain(&line[cursor..whole.start()]));
        }
        spans.push(Span::Strong(inner.as_str()));
        cursor = whole.end();
    }
    if cursor < line.len() {
        spans.push(Span::Plain(&line[cursor..]));
    }
    spans
}
