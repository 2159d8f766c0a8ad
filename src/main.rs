//! Mindful - 终端会话驱动
//!
//! 入口：初始化日志、加载配置、构建引擎，然后在终端里跑一次会话。
//! 每条用户输入的情绪分类在后台任务中与回合生成并行，结果随到随写入情绪上下文。
//!
//! 用法：`mindful [--config PATH] [--program 5-day|3-day|1-day] [--day N] [--save] [--list-models]`

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use mindful::config::{load_config, AppConfig};
use mindful::core::{EngineBuilder, Session, SessionState, TurnOutcome};
use mindful::emotion::EmotionContext;
use mindful::llm::GeminiProvider;
use mindful::protocol::{emphasis_spans, paragraphs, Segment, Span, WidgetKind};
use mindful::ScriptConfig;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// 终端里的一次正念会话
#[derive(Debug, Parser)]
#[command(name = "mindful", version, about)]
struct Cli {
    /// 额外的配置文件（覆盖 config/default.toml）
    #[arg(long)]
    config: Option<PathBuf>,

    /// 课程：5-day、3-day 或 1-day（默认取配置）
    #[arg(long)]
    program: Option<String>,

    /// 第几天，从 1 开始（默认取配置）
    #[arg(long)]
    day: Option<u32>,

    /// 会话结束后把记录写入当前目录
    #[arg(long)]
    save: bool,

    /// 列出第一个凭据可用的模型后退出
    #[arg(long)]
    list_models: bool,
}

fn render(outcome: &TurnOutcome) -> Vec<(Option<u64>, String)> {
    let mut blocks = Vec::new();
    for segment in &outcome.segments {
        match segment {
            Segment::Text { content } => {
                for line in paragraphs(content) {
                    let rendered: String = emphasis_spans(line)
                        .into_iter()
                        .map(|span| match span {
                            Span::Plain(s) => s.to_string(),
                            Span::Strong(s) => format!("\x1b[1m{s}\x1b[0m"),
                        })
                        .collect();
                    blocks.push((None, rendered));
                }
            }
            Segment::TimedPause { seconds, label } => {
                blocks.push((Some(u64::from(*seconds)), format!("  ~ {label} ({seconds}s) ~")));
            }
            Segment::Widget {
                kind: WidgetKind::PhoneObservation,
            } => blocks.push((
                None,
                "  [Hold your phone with the screen locked. Notice its weight, texture and temperature.]"
                    .to_string(),
            )),
            Segment::Widget {
                kind: WidgetKind::SoberPractice,
            } => blocks.push((
                None,
                "  [Stop - Observe - Breathe - Expand - Respond]".to_string(),
            )),
        }
    }
    blocks
}

async fn show(outcome: &TurnOutcome) {
    for (pause, line) in render(outcome) {
        println!("{line}");
        if let Some(secs) = pause {
            tokio::time::sleep(Duration::from_secs(secs)).await;
        }
    }
    if outcome.used_fallback() {
        tracing::debug!("Turn produced by fallback script");
    }
}

async fn list_models(cfg: &AppConfig) -> anyhow::Result<()> {
    let pool = cfg.llm.credential_pool().context("No credentials configured")?;
    let provider = GeminiProvider::new(cfg.llm.base_url.as_deref(), &cfg.llm.model, cfg.llm.timeout_secs);
    let models = provider
        .list_models(pool.first())
        .await
        .context("Failed to list models")?;
    for name in models {
        println!("{name}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mindful::observability::init();

    let args = Cli::parse();
    let cfg = load_config(args.config.clone()).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    });

    if args.list_models {
        return list_models(&cfg).await;
    }

    let program = args.program.clone().unwrap_or_else(|| cfg.session.program.clone());
    let day = args.day.unwrap_or(cfg.session.day);
    let script = ScriptConfig::for_program(&program, day).context("Invalid session selection")?;

    let engine = Arc::new(EngineBuilder::new(cfg).build());
    let mood = Arc::new(EmotionContext::new());
    let mut mood_rx = mood.subscribe();
    tokio::spawn(async move {
        while mood_rx.changed().await.is_ok() {
            let label = *mood_rx.borrow_and_update();
            tracing::info!(%label, "Mood updated");
        }
    });

    let mut session = Session::new(script);
    let opening = session
        .start(&engine.orchestrator)
        .await
        .context("Failed to start session")?;
    show(&opening).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    while session.state() != SessionState::Completed {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }

        let classifier_engine = Arc::clone(&engine);
        let mood_writer = Arc::clone(&mood);
        let utterance = line.clone();
        tokio::spawn(async move {
            let label = classifier_engine.classifier.classify(&utterance).await;
            mood_writer.publish(label);
        });

        let outcome = session.respond(&engine.orchestrator, &line).await?;
        show(&outcome).await;
    }

    if args.save {
        let name = session.transcript_file_name();
        tokio::fs::write(&name, session.export_transcript())
            .await
            .with_context(|| format!("Failed to write {name}"))?;
        println!("Transcript saved to {name}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parses_session_flags() {
        let cli = Cli::try_parse_from([
            "mindful", "--config", "local.toml", "--program", "3-day", "--day", "2", "--save",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("local.toml")));
        assert_eq!(cli.program.as_deref(), Some("3-day"));
        assert_eq!(cli.day, Some(2));
        assert!(cli.save);
        assert!(!cli.list_models);
    }

    #[test]
    fn test_cli_rejects_bad_day_and_unknown_flags() {
        assert!(Cli::try_parse_from(["mindful", "--day", "two"]).is_err());
        assert!(Cli::try_parse_from(["mindful", "--verbose"]).is_err());
        assert!(Cli::try_parse_from(["mindful", "--list-models"]).unwrap().list_models);
    }
}
