// Content selection for media backups and post deletion.

use std::collections::HashSet;
use std::str::FromStr;

use crate::bluesky::models::MediaKind;

/// Label-based selection of posts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentFilter {
    /// Keep only items carrying at least one of these labels.
    pub tags: Option<HashSet<String>>,
    /// Keep only items with no labels at all. Takes precedence over `tags`.
    pub untagged_only: bool,
}

impl ContentFilter {
    /// Build from a comma-separated tag list (blank entries ignored).
    pub fn new(filter_tags: Option<&str>, untagged_only: bool) -> Self {
        let tags = filter_tags
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect::<HashSet<_>>()
            })
            .filter(|set| !set.is_empty());
        Self {
            tags,
            untagged_only,
        }
    }

    pub fn is_active(&self) -> bool {
        self.untagged_only || self.tags.is_some()
    }

    pub fn matches(&self, labels: &[String]) -> bool {
        if self.untagged_only {
            return labels.is_empty();
        }
        match &self.tags {
            Some(tags) => labels.iter().any(|l| tags.contains(l)),
            None => true,
        }
    }
}

/// Which media kinds a backup collects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MediaSelection {
    #[default]
    All,
    Photos,
    Videos,
}

impl MediaSelection {
    pub fn includes(&self, kind: MediaKind) -> bool {
        match self {
            MediaSelection::All => true,
            MediaSelection::Photos => kind == MediaKind::Photo,
            MediaSelection::Videos => kind == MediaKind::Video,
        }
    }
}

impl FromStr for MediaSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(MediaSelection::All),
            "photos" => Ok(MediaSelection::Photos),
            "videos" => Ok(MediaSelection::Videos),
            other => Err(format!("unknown media type '{other}' (expected all, photos or videos)")),
        }
    }
}
