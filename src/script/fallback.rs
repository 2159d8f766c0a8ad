//! 本地脚本兜底：远程模型不可用时按 (技术, 轮数) 给出下一句
//!
//! stage = turn_count / 2，超出脚本长度时钳到最后一步；最后一步总带 `[SESSION_COMPLETE]`，
//! 保证兜底路径一定会结束会话而不是无限循环。纯函数，同样输入同样输出。

use crate::script::Technique;

/// 脚本表版本；修改任何台词时递增
pub const SCRIPT_VERSION: u32 = 1;

/// 单个技术的脚本：开场白 + 按 stage 排列的步骤
#[derive(Debug)]
pub struct TechniqueScript {
    pub opening: &'static str,
    pub steps: &'static [&'static str],
}

impl TechniqueScript {
    pub fn last_index(&self) -> usize {
        self.steps.len() - 1
    }
}

const DIGITAL_RAISIN: TechniqueScript = TechniqueScript {
    opening: "Welcome to Day 1. Today we break the autopilot. Please sit comfortably with your phone nearby. Ready?",
    steps: &[
        "Good. Now pick up your phone, but keep the screen locked and black. We won't turn it on.\n\n[OBSERVE_PHONE]\n\nWhen you're ready, tell me - is it heavy or light?",
        "Now feel the texture. Smooth glass? A rough case? Cool metal edges?\n\n[Pause 10 seconds]\n\nWhat do you notice?",
        "Feel the temperature. Is it cold, warm, or neutral?\n\n[Pause 8 seconds]",
        "Now look at the black screen. Do you notice any impulse to unlock it? Where do you feel that 'itch' - in your thumb, chest, or somewhere else?\n\n[Pause 10 seconds]",
        "This is 'autopilot' - we usually unlock without thinking. Today you broke that pattern just by noticing. What was it like to hold your phone without using it?",
        "Great work today. You've taken the first step in mindful phone use. [SESSION_COMPLETE]",
    ],
};

const RAIN: TechniqueScript = TechniqueScript {
    opening: "Welcome back. Before we start, quick check: Are you feeling Hungry, Angry, Lonely, or Tired right now?",
    steps: &[
        "Thank you. Now close your eyes and imagine hearing a notification sound, or seeing that red dot appear. Let the feeling arise.",
        "This is R - Recognize. Can you name the feeling? Is it Anxiety? FOMO? Curiosity? Just label it.",
        "Good. Now A - Accept. Don't push the feeling away. Let it sit there. It belongs.",
        "Now I - Investigate. Scan your body. Where does this feeling live? Throat tightness? Chest flutter? Stomach knot?",
        "Finally, N - Non-identify. This feeling is a passing event, not 'you'. You are the sky; this feeling is just a cloud passing through.",
        "How did the feeling change as you observed it? Did it get smaller, stay the same, or shift location? [SESSION_COMPLETE]",
    ],
};

const SOBER: TechniqueScript = TechniqueScript {
    opening: "Hello. Today we're learning SOBER - a portable tool for when you catch yourself doom-scrolling. Ready?",
    steps: &[
        "Let me teach you SOBER - a 5-step tool you can use anytime. First, let's learn each step:\n\n**S** = Stop (freeze your body)\n**O** = Observe (what am I feeling?)\n**B** = Breathe (3 deep breaths)\n**E** = Expand (whole body awareness)\n**R** = Respond (what do I actually need?)\n\nReady to practice each step?",
        "**S - STOP**\n\nImagine you just noticed yourself mindlessly scrolling. Physically freeze your thumb right now. Hold it still.\n\n[Pause 5 seconds]\n\nGood. What did that feel like?",
        "**O - OBSERVE**\n\nNow ask yourself: What was I doing? What am I feeling right now? Boredom? Loneliness? Avoidance? Just notice without judgment.",
        "**B - BREATHE**\n\nShift all attention to your breath. Let's take 3 deep breaths together, anchored in your belly.\n\n[Pause 15 seconds]\n\nHow do you feel now?",
        "**E - EXPAND**\n\nWiden your awareness to your whole body. Feel your feet on the floor... your seat in the chair... your shoulders... your hands.\n\n[Pause 10 seconds]",
        "**R - RESPOND**\n\nWith this wider awareness - what do you actually need right now? The app? Or maybe water, a stretch, or fresh air?\n\nNow let's practice the full sequence:\n\n[SOBER_PRACTICE]\n\nHow did that feel?",
        "Excellent! SOBER is now yours. Use it whenever you catch the autopilot. [SESSION_COMPLETE]",
    ],
};

const URGE_SURFING: TechniqueScript = TechniqueScript {
    opening: "Welcome. Today we learn Urge Surfing. An urge to check your phone is like an ocean wave - it rises, peaks, and crashes. We usually drown (give in) or fight it (suppress). Today, we learn to surf. Ready?",
    steps: &[
        "Bring to mind a craving to check your phone. Maybe imagining an unread message or that pull to scroll. Let the urge arise naturally.",
        "Where do you feel this urge in your body? Hands? Jaw? Chest? Stomach? Just locate it.",
        "Good. Now use your breath as your surfboard. Breathe slowly into that area. Don't fight the wave - ride it.\n\n[Pause 15 seconds]",
        "Notice if the urge is peaking now. Don't act. Just watch. Like a wave, it will crest and begin to fall...\n\n[Pause 10 seconds]",
        "Has the wave changed? Is it smaller now, or different in some way?",
        "You just proved that urges pass. What did you learn about cravings? Well done, surfer. Every urge is just a wave you can ride. [SESSION_COMPLETE]",
    ],
};

const LEAVES_ON_STREAM: TechniqueScript = TechniqueScript {
    opening: "Welcome to Day 5 - our final session. Today we work with thoughts and plan for the future. Close your eyes and imagine sitting beside a gentle stream. Ready?",
    steps: &[
        "Now imagine your thoughts - notifications, tweets, posts - as leaves floating on the water...",
        "You're on the bank. You don't need to grab them. Just watch them drift by. Practice this for a moment with whatever thoughts arise...\n\n[Pause 15 seconds]",
        "How was that? Were you able to let thoughts float by?",
        "Now think about your last 30 minutes of phone use. Was it Nourishing (gave energy, connection) or Depleting (drained you, left you hollow)?",
        "Whatever you noticed, no judgment. Just noticing is progress. For maintenance: Try one 'Phone-Free Walk' this week. Even 10 minutes.",
        "Congratulations on completing the program! Looking back, what's one thing that will stay with you? You now have a toolkit for mindful phone use. Be gentle with yourself. [SESSION_COMPLETE]",
    ],
};

const GENERIC: TechniqueScript = TechniqueScript {
    opening: "Welcome. Find a comfortable position. Notice where your body meets the chair. Let me know when you're ready.",
    steps: &[
        "Good. Take a breath and notice what's present for you right now.",
        "What are you noticing in your body as you sit with this?",
        "Stay with that awareness. There's no need to change anything.",
        "What did you notice directly in your body? Was it pleasant, unpleasant, or neutral?",
        "Thank you for your practice today. [SESSION_COMPLETE]",
    ],
};

/// 兜底脚本引擎（无状态）
#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackScriptEngine;

impl FallbackScriptEngine {
    pub fn script(technique: Technique) -> &'static TechniqueScript {
        match technique {
            Technique::DigitalRaisin => &DIGITAL_RAISIN,
            Technique::Rain => &RAIN,
            Technique::Sober => &SOBER,
            Technique::UrgeSurfing => &URGE_SURFING,
            Technique::LeavesOnStream => &LEAVES_ON_STREAM,
            Technique::Generic => &GENERIC,
        }
    }

    /// turn_count 为新提示之前的历史条数；0 表示会话开始
    pub fn step(technique: Technique, turn_count: usize) -> &'static str {
        let script = Self::script(technique);
        if turn_count == 0 {
            return script.opening;
        }
        let stage = (turn_count / 2).min(script.last_index());
        script.steps[stage]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::parse;

    #[test]
    fn test_turn_zero_is_opening_line() {
        for t in Technique::ALL {
            assert_eq!(FallbackScriptEngine::step(t, 0), FallbackScriptEngine::script(t).opening);
        }
        assert!(FallbackScriptEngine::step(Technique::Sober, 0).contains("SOBER"));
    }

    #[test]
    fn test_stage_is_half_turn_count() {
        assert_eq!(FallbackScriptEngine::step(Technique::Rain, 1), RAIN.steps[0]);
        assert_eq!(FallbackScriptEngine::step(Technique::Rain, 3), RAIN.steps[1]);
        assert_eq!(FallbackScriptEngine::step(Technique::Rain, 4), RAIN.steps[2]);
    }

    #[test]
    fn test_step_is_pure() {
        for t in Technique::ALL {
            for n in 0..20 {
                assert_eq!(FallbackScriptEngine::step(t, n), FallbackScriptEngine::step(t, n));
            }
        }
    }

    #[test]
    fn test_late_turns_clamp_to_completing_line() {
        for t in Technique::ALL {
            let script = FallbackScriptEngine::script(t);
            let last = script.steps[script.last_index()];
            for n in (2 * script.last_index())..(2 * script.last_index() + 10) {
                let line = FallbackScriptEngine::step(t, n.max(1));
                assert_eq!(line, last, "{t} at turn {n}");
                assert!(parse(line).is_complete);
            }
        }
    }

    #[test]
    fn test_only_final_step_completes() {
        for t in Technique::ALL {
            let script = FallbackScriptEngine::script(t);
            assert!(!parse(script.opening).is_complete);
            for step in &script.steps[..script.last_index()] {
                assert!(!parse(step).is_complete, "{t}: {step}");
            }
        }
    }

    #[test]
    fn test_stage_never_decreases() {
        let mut prev = 0;
        for n in 1..30 {
            let line = FallbackScriptEngine::step(Technique::UrgeSurfing, n);
            let idx = URGE_SURFING.steps.iter().position(|s| *s == line).unwrap();
            assert!(idx >= prev);
            prev = idx;
        }
    }
}
