// Signal extraction: flatten a profile into the features classifiers read.

use std::sync::LazyLock;

use regex_lite::Regex;

use crate::bluesky::models::Profile;

/// Letters followed by four or more digits, e.g. `genericuser12345`.
static GENERIC_HANDLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]+[0-9]{4,}(\.|$)").expect("valid regex"));

/// Normalized features derived from a single profile.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSignals {
    /// followers / max(1, follows)
    pub ratio: f64,
    /// Lowercased display name, handle and bio joined by spaces.
    pub text_blob: String,
    pub bio_empty: bool,
    pub avatar_missing: bool,
    pub handle_is_generic: bool,
    pub posts: u64,
    pub follows: u64,
    pub followers: u64,
}

impl ProfileSignals {
    /// Extract signals. Total: missing fields read as empty or zero.
    pub fn from_profile(profile: &Profile) -> Self {
        let display = profile.display_name.as_deref().unwrap_or_default();
        let bio = profile.description.as_deref().unwrap_or_default();
        let handle = profile.handle.to_lowercase();

        Self {
            ratio: follow_ratio(profile.followers_count, profile.follows_count),
            text_blob: format!("{display} {handle} {bio}").to_lowercase(),
            bio_empty: bio.trim().is_empty(),
            avatar_missing: profile
                .avatar
                .as_deref()
                .map_or(true, |a| a.trim().is_empty()),
            handle_is_generic: GENERIC_HANDLE.is_match(&handle),
            posts: profile.posts_count,
            follows: profile.follows_count,
            followers: profile.followers_count,
        }
    }
}

/// Followers per followed account. Never divides by zero.
pub fn follow_ratio(followers: u64, follows: u64) -> f64 {
    followers as f64 / follows.max(1) as f64
}

/// Ratio formatted the way reason strings and exports show it.
pub fn format_ratio(ratio: f64) -> String {
    format!("{ratio:.3}")
}
