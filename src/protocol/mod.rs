//! 内容协议：assistant 文本中的停顿 / 交互组件 / 结束标记

pub mod parser;
pub mod render;

pub use parser::{parse, strip_completion, ParsedTurn, Segment, WidgetKind, PAUSE_LABEL};
pub use render::{emphasis_spans, paragraphs, Span};
