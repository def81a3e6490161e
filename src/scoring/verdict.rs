// Verdict resolution: combine classifier outputs under the run's mode.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::signals::ProfileSignals;
use super::{bot, marketer, Classification};
use crate::bluesky::models::Profile;

/// Which classifiers decide a match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClassifierMode {
    /// Only bots match.
    #[default]
    BotOnly,
    /// Bots first, then marketers.
    IncludeMarketers,
    /// Only marketers match; bot signals are ignored.
    MarketerOnly,
}

/// Score thresholds, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub bot: u32,
    pub marketer: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            bot: bot::BOT_SCORE_THRESHOLD,
            marketer: marketer::MARKETER_SCORE_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Bot,
    Marketer,
    None,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Bot => "bot",
            Category::Marketer => "marketer",
            Category::None => "none",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The classification result for one profile in one run.
///
/// When `category` is `None`, `score` and `reasons` come from the
/// classifier that governs the mode, so near-misses stay explainable.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub category: Category,
    pub score: u32,
    pub reasons: Vec<String>,
}

impl Verdict {
    pub fn is_match(&self) -> bool {
        self.category != Category::None
    }

    /// Reasons joined in evaluation order.
    pub fn reason(&self) -> String {
        self.reasons.join(", ")
    }

    fn matched(category: Category, result: Classification) -> Self {
        Self {
            category,
            score: result.score,
            reasons: result.reasons,
        }
    }

    fn no_match(result: Classification) -> Self {
        Self::matched(Category::None, result)
    }
}

/// A classifier result counts only if at least one signal fired, so a
/// zero threshold never matches an empty result.
fn meets(result: &Classification, threshold: u32) -> bool {
    !result.reasons.is_empty() && result.score >= threshold
}

/// Resolve a single verdict from already-computed classifier outputs.
///
/// Bot takes precedence over marketer when both thresholds are met.
pub fn resolve(
    mode: ClassifierMode,
    thresholds: &Thresholds,
    bot_result: Classification,
    marketer_result: Classification,
) -> Verdict {
    match mode {
        ClassifierMode::MarketerOnly => {
            if meets(&marketer_result, thresholds.marketer) {
                Verdict::matched(Category::Marketer, marketer_result)
            } else {
                Verdict::no_match(marketer_result)
            }
        }
        ClassifierMode::BotOnly | ClassifierMode::IncludeMarketers => {
            if meets(&bot_result, thresholds.bot) {
                Verdict::matched(Category::Bot, bot_result)
            } else if mode == ClassifierMode::IncludeMarketers
                && meets(&marketer_result, thresholds.marketer)
            {
                Verdict::matched(Category::Marketer, marketer_result)
            } else {
                Verdict::no_match(bot_result)
            }
        }
    }
}

/// Extract signals, run the classifiers the mode needs, and resolve.
pub fn evaluate(profile: &Profile, mode: ClassifierMode, thresholds: &Thresholds) -> Verdict {
    let signals = ProfileSignals::from_profile(profile);
    let bot_result = match mode {
        ClassifierMode::MarketerOnly => Classification::default(),
        _ => bot::classify(&signals),
    };
    let marketer_result = match mode {
        ClassifierMode::BotOnly => Classification::default(),
        _ => marketer::classify(&signals),
    };
    resolve(mode, thresholds, bot_result, marketer_result)
}
