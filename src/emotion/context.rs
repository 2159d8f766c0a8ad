//! 会话级情绪上下文：单一写者，多个只读订阅者（背景渲染等）
//!
//! 调用方持有 EmotionContext 并把 receiver 交给渲染协作者，不使用全局可变状态。
//! 分类结果随到随写，不与回合生成排序。

use tokio::sync::watch;

use crate::emotion::EmotionLabel;

/// 不实现 Clone：每个会话只有一个写者
#[derive(Debug)]
pub struct EmotionContext {
    tx: watch::Sender<EmotionLabel>,
}

impl EmotionContext {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(EmotionLabel::Neutral);
        Self { tx }
    }

    pub fn publish(&self, label: EmotionLabel) {
        self.tx.send_replace(label);
    }

    pub fn current(&self) -> EmotionLabel {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<EmotionLabel> {
        self.tx.subscribe()
    }
}

impl Default for EmotionContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_see_latest_label() {
        let ctx = EmotionContext::new();
        let mut rx = ctx.subscribe();
        assert_eq!(*rx.borrow(), EmotionLabel::Neutral);

        ctx.publish(EmotionLabel::Anxious);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), EmotionLabel::Anxious);
        assert_eq!(ctx.current(), EmotionLabel::Anxious);
    }
}
