// Promotional-account heuristics.

use std::sync::LazyLock;

use regex_lite::Regex;

use super::signals::{format_ratio, ProfileSignals};
use super::Classification;

/// Default score at or above which a profile is treated as a marketer.
pub const MARKETER_SCORE_THRESHOLD: u32 = 30;

static LINK_HUBS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"linktr\.ee|beacons?\.ai|lnk\.bio|carrd\.co|stan\.store|gumroad|ko-fi|patreon|buymeacoffee|onlyfans|fansly|taplink|bit\.ly|tinyurl|\bt\.co\b|amzn\.to",
    )
    .expect("valid regex")
});

static PROMO_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:brand(?:ing)?|growth|dm (?:me|us)|promo|marketing|spon|collab|partnership|ambassador|leads?|funnels?|newsletter|courses?|coaching|consult(?:ing)?|shop my|discount|affiliate|dropship|crypto|nft)",
    )
    .expect("valid regex")
});

/// Emoji that show up disproportionately in promotional bios.
const PROMO_EMOJI: &[char] = &[
    '🚀', '📈', '💰', '💸', '🤑', '💎', '🔥', '💯', '📢', '📣', '🛒', '🎁', '👇', '🔗', '📩', '✅',
];

const PROMO_EMOJI_MIN: usize = 3;

/// Score a profile for promotional-account signals.
pub fn classify(s: &ProfileSignals) -> Classification {
    let mut out = Classification::default();

    if LINK_HUBS.is_match(&s.text_blob) {
        out.add(25, "Contains link hub (e.g., linktr.ee)");
    }

    if PROMO_KEYWORDS.is_match(&s.text_blob) {
        out.add(20, "Contains promotional keywords (e.g., marketing, course)");
    }

    if s.posts >= 20 && s.follows >= 5000 && s.ratio < 0.5 {
        out.add(
            15,
            format!(
                "High follow-to-follower skew (ratio: {})",
                format_ratio(s.ratio)
            ),
        );
    }

    let emoji = count_promo_emoji(&s.text_blob);
    if emoji >= PROMO_EMOJI_MIN {
        out.add(10, format!("Excessive promotional emojis ({emoji})"));
    }

    out
}

/// Number of promotional emoji characters in `text`, counting repeats.
pub fn count_promo_emoji(text: &str) -> usize {
    text.chars().filter(|c| PROMO_EMOJI.contains(c)).count()
}
