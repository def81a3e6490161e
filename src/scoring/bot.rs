// Automated-account heuristics.
//
// Additive scoring over independent signals. Signals are evaluated in a
// fixed order so the reason list always reads the same way; order never
// affects the score.

use std::sync::LazyLock;

use regex_lite::Regex;

use super::signals::{format_ratio, ProfileSignals};
use super::Classification;

/// Default score at or above which a profile is treated as a bot.
pub const BOT_SCORE_THRESHOLD: u32 = 35;

static BAIT_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"ai|girls?|sexy|crypto|btc|nft|onlyfans?|escort|xxx|free|hot|bet|gamble")
        .expect("valid regex")
});

/// Score a profile for automated-account signals.
pub fn classify(s: &ProfileSignals) -> Classification {
    let mut out = Classification::default();
    let ratio = format_ratio(s.ratio);

    if s.follows > 4000 && s.ratio < 0.01 {
        out.add(50, format!("Extreme mass-follow pattern (ratio: {ratio})"));
    } else if s.follows > 1200 && s.ratio < 0.15 {
        out.add(30, format!("Mass-follow pattern (ratio: {ratio})"));
    }

    if s.follows > 100 && s.followers < 15 && s.posts < 5 && s.ratio < 0.05 {
        out.add(40, format!("Likely empty spam profile (ratio: {ratio})"));
    }

    if s.followers < 5 && s.posts < 2 && BAIT_KEYWORDS.is_match(&s.text_blob) {
        out.add(25, "Keyword-bait on near-empty account");
    }

    if s.bio_empty {
        out.add(5, "Missing profile bio");
    }
    if s.avatar_missing {
        out.add(5, "Default profile picture");
    }
    if s.handle_is_generic {
        out.add(5, "Generic handle with numbers");
    }

    out
}
