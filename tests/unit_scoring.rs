// Unit tests for profile classification.
//
// Known bot and marketer profiles with their exact scores and reasons,
// the fixed reason order, threshold boundaries, and verdict resolution
// across classifier modes.

use skysweep::bluesky::models::Profile;
use skysweep::scoring::signals::{follow_ratio, ProfileSignals};
use skysweep::scoring::verdict::{evaluate, Category, ClassifierMode, Thresholds};
use skysweep::scoring::{bot, marketer, Classification};

#[allow(clippy::too_many_arguments)]
fn profile(
    handle: &str,
    display_name: Option<&str>,
    bio: Option<&str>,
    avatar: Option<&str>,
    follows: u64,
    followers: u64,
    posts: u64,
) -> Profile {
    Profile {
        did: format!("did:plc:{}", handle.replace('.', "")),
        handle: handle.to_string(),
        display_name: display_name.map(str::to_string),
        description: bio.map(str::to_string),
        avatar: avatar.map(str::to_string),
        follows_count: follows,
        followers_count: followers,
        posts_count: posts,
    }
}

fn bot_of(p: &Profile) -> Classification {
    bot::classify(&ProfileSignals::from_profile(p))
}

fn marketer_of(p: &Profile) -> Classification {
    marketer::classify(&ProfileSignals::from_profile(p))
}

fn generic_bot() -> Profile {
    profile("genericuser12345", None, Some(""), Some(""), 5000, 10, 1)
}

fn clear_marketer() -> Profile {
    profile(
        "mrmarketer.bsky.social",
        Some("Crypto Coach"),
        Some("🚀 Growth hacker | Get my free e-book! linktr.ee/myfunnel"),
        Some("https://cdn.example/avatar.jpg"),
        4000,
        400,
        150,
    )
}

// ============================================================
// Signals
// ============================================================

#[test]
fn ratio_with_zero_follows_does_not_divide_by_zero() {
    assert_eq!(follow_ratio(7, 0), 7.0);
    assert_eq!(follow_ratio(0, 0), 0.0);
}

#[test]
fn missing_fields_read_as_empty() {
    let s = ProfileSignals::from_profile(&Profile::default());
    assert!(s.bio_empty);
    assert!(s.avatar_missing);
    assert!(!s.handle_is_generic);
    assert_eq!(s.ratio, 0.0);
}

// ============================================================
// Bot classifier
// ============================================================

#[test]
fn clear_bot_scores_high_with_all_reasons() {
    let result = bot_of(&generic_bot());
    assert!(result.score > 40, "got {}", result.score);
    for reason in [
        "Extreme mass-follow pattern (ratio: 0.002)",
        "Default profile picture",
        "Missing profile bio",
        "Generic handle with numbers",
    ] {
        assert!(result.reasons.iter().any(|r| r == reason), "missing {reason}");
    }
}

#[test]
fn healthy_user_scores_zero() {
    let p = profile(
        "normaluser",
        None,
        Some("Just a regular user enjoying the sky."),
        Some("https://cdn.example/a.jpg"),
        200,
        1800,
        500,
    );
    let result = bot_of(&p);
    assert_eq!(result.score, 0);
    assert!(result.reasons.is_empty());
}

#[test]
fn new_user_only_loses_points_for_empty_profile() {
    let p = profile("newbie", None, Some(""), Some(""), 5, 2, 1);
    let result = bot_of(&p);
    assert_eq!(result.score, 10);
    assert_eq!(
        result.reasons,
        vec!["Missing profile bio", "Default profile picture"]
    );
}

#[test]
fn mass_follower_stays_below_threshold() {
    let p = profile(
        "followbackguy",
        None,
        Some("I follow back!"),
        Some("https://cdn.example/a.jpg"),
        1500,
        160,
        20,
    );
    let result = bot_of(&p);
    assert_eq!(result.score, 30);
    assert_eq!(result.reasons, vec!["Mass-follow pattern (ratio: 0.107)"]);
    assert!(result.score < bot::BOT_SCORE_THRESHOLD);
}

#[test]
fn keyword_bait_on_empty_account() {
    let p = profile(
        "",
        Some("Free Crypto Girls AI"),
        Some("check my profile for more"),
        Some("https://cdn.example/a.jpg"),
        10,
        1,
        0,
    );
    let result = bot_of(&p);
    assert_eq!(result.score, 25);
    assert_eq!(result.reasons, vec!["Keyword-bait on near-empty account"]);
}

#[test]
fn extreme_and_plain_mass_follow_are_exclusive() {
    let result = bot_of(&generic_bot());
    assert!(!result
        .reasons
        .iter()
        .any(|r| r.starts_with("Mass-follow pattern")));
}

#[test]
fn bot_reasons_follow_evaluation_order() {
    let result = bot_of(&generic_bot());
    assert_eq!(
        result.reasons,
        vec![
            "Extreme mass-follow pattern (ratio: 0.002)",
            "Likely empty spam profile (ratio: 0.002)",
            "Missing profile bio",
            "Default profile picture",
            "Generic handle with numbers",
        ]
    );
    assert_eq!(result.score, 50 + 40 + 5 + 5 + 5);
}

#[test]
fn classification_is_deterministic() {
    let p = clear_marketer();
    assert_eq!(bot_of(&p), bot_of(&p));
    assert_eq!(marketer_of(&p), marketer_of(&p));
}

// ============================================================
// Marketer classifier
// ============================================================

#[test]
fn clear_marketer_scores_high() {
    let result = marketer_of(&clear_marketer());
    assert!(result.score > 30, "got {}", result.score);
    assert_eq!(
        &result.reasons[..2],
        &[
            "Contains link hub (e.g., linktr.ee)",
            "Contains promotional keywords (e.g., marketing, course)",
        ]
    );
}

#[test]
fn streamer_with_own_link_is_not_a_marketer() {
    let p = profile(
        "fauxstalgia.bsky.social",
        Some("Fauxstalgia"),
        Some("Infrequent Twitch Streamer, VR Enthusiast, Synthwave Enjoyer\nHe/Him\nhttps://twitch.tv/fauxstalgia"),
        Some("https://cdn.example/a.jpg"),
        189,
        68,
        167,
    );
    assert_eq!(marketer_of(&p).score, 0);
}

#[test]
fn decorative_unicode_bio_is_not_a_marketer() {
    let p = profile(
        "monsieur-mustache.bsky.social",
        Some("𝕄ℂ𝟡𝟘𝟘𝕗𝕥 ℍ𝕚𝕡𝕤𝕥𝕖𝕣 𝕁𝕖𝕤𝕦𝕤"),
        Some("40ꜱ | ᴅᴀᴅᴅʏ ɪꜱꜱᴜᴇꜱ | ᴄʀᴏꜱꜱꜰɪᴛ | 🔞MDNI\n“ᴄᴏᴍɪɴ' ᴏᴜᴛ ᴏꜰ ᴍʏ ᴄᴀᴠᴇ ᴀɴᴅ ɪ'ᴠᴇ ʙᴇᴇɴ ᴅᴏɪɴ' ᴊᴜꜱᴛ ꜰɪɴᴇ.”"),
        Some("https://cdn.example/a.jpg"),
        873,
        1125,
        3159,
    );
    assert_eq!(marketer_of(&p).score, 0);
}

#[test]
fn ordinary_user_is_not_a_marketer() {
    let p = profile(
        "slc.bsky.social",
        Some("NotABee, SLC"),
        Some("Definitely not a bee posting on BlueSky"),
        Some("https://cdn.example/a.jpg"),
        12,
        20,
        27,
    );
    assert_eq!(marketer_of(&p).score, 0);
}

#[test]
fn emoji_and_keyword_reach_threshold_exactly() {
    let p = profile(
        "emojispammer.bsky.social",
        Some("Get Rich Quick"),
        Some("DM me 🚀📈💰"),
        Some("https://cdn.example/a.jpg"),
        50,
        50,
        5,
    );
    let result = marketer_of(&p);
    assert_eq!(result.score, 30);
    assert_eq!(
        result.reasons,
        vec![
            "Contains promotional keywords (e.g., marketing, course)",
            "Excessive promotional emojis (3)",
        ]
    );
}

#[test]
fn follow_skew_needs_volume() {
    let skewed = profile("shop.example.com", None, Some("hi"), None, 6000, 900, 40);
    let result = marketer_of(&skewed);
    assert_eq!(result.score, 15);
    assert_eq!(
        result.reasons,
        vec!["High follow-to-follower skew (ratio: 0.150)"]
    );

    let quiet = profile("shop.example.com", None, Some("hi"), None, 6000, 900, 19);
    assert_eq!(marketer_of(&quiet).score, 0);
}

#[test]
fn promo_keywords_match_inside_longer_words() {
    let p = profile(
        "tips.bsky.social",
        None,
        Some("#marketingtips and #rebranding daily"),
        Some("https://cdn.example/a.jpg"),
        50,
        50,
        5,
    );
    let result = marketer_of(&p);
    assert_eq!(result.score, 20);
    assert_eq!(
        result.reasons,
        vec!["Contains promotional keywords (e.g., marketing, course)"]
    );
}

// ============================================================
// Verdicts
// ============================================================

#[test]
fn score_exactly_at_threshold_matches() {
    let p = profile(
        "emojispammer.bsky.social",
        Some("Get Rich Quick"),
        Some("DM me 🚀📈💰"),
        Some("https://cdn.example/a.jpg"),
        50,
        50,
        5,
    );
    let at = evaluate(&p, ClassifierMode::MarketerOnly, &Thresholds::default());
    assert_eq!(at.category, Category::Marketer);
    assert_eq!(at.score, 30);

    let above = Thresholds {
        bot: 35,
        marketer: 31,
    };
    let miss = evaluate(&p, ClassifierMode::MarketerOnly, &above);
    assert_eq!(miss.category, Category::None);
    assert!(!miss.is_match());
}

#[test]
fn bot_only_mode_ignores_marketers() {
    let verdict = evaluate(&clear_marketer(), ClassifierMode::BotOnly, &Thresholds::default());
    assert_eq!(verdict.category, Category::None);
}

#[test]
fn include_marketers_flags_a_marketer() {
    let verdict = evaluate(
        &clear_marketer(),
        ClassifierMode::IncludeMarketers,
        &Thresholds::default(),
    );
    assert_eq!(verdict.category, Category::Marketer);
    assert!(verdict.reason().contains("link hub"));
}

#[test]
fn bot_wins_when_both_match() {
    let mut p = generic_bot();
    p.description = Some("DM me 🚀📈💰 linktr.ee/x".to_string());
    let verdict = evaluate(&p, ClassifierMode::IncludeMarketers, &Thresholds::default());
    assert_eq!(verdict.category, Category::Bot);
}

#[test]
fn marketer_only_mode_never_reports_bots() {
    let verdict = evaluate(&generic_bot(), ClassifierMode::MarketerOnly, &Thresholds::default());
    assert_eq!(verdict.category, Category::None);
}
