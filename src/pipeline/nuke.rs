// Bulk deletion of the session account's own records.
//
// Nothing is listed or deleted until the operator types the exact target
// name. Records are then listed in full, filtered, and deleted one at a
// time through the retrying mutator, which also paces the stream.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::batch::{run_sequential, BatchReport};
use super::filter::ContentFilter;
use super::paginate::{paginate, FetchError, PAGE_SIZE};
use super::throttle::{mutate, RetryPolicy};
use crate::bluesky::models::RepoRecord;
use crate::bluesky::traits::{SocialGraph, LIKE_COLLECTION, POST_COLLECTION};

/// Default pause between deletions.
pub const DEFAULT_DELETE_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NukeTarget {
    AllPosts,
    MediaPosts,
    TextPosts,
    Likes,
}

impl NukeTarget {
    pub const ALL: [NukeTarget; 4] = [
        NukeTarget::AllPosts,
        NukeTarget::MediaPosts,
        NukeTarget::TextPosts,
        NukeTarget::Likes,
    ];

    /// The name the operator types to confirm.
    pub fn as_str(&self) -> &'static str {
        match self {
            NukeTarget::AllPosts => "all-posts",
            NukeTarget::MediaPosts => "media-posts",
            NukeTarget::TextPosts => "text-posts",
            NukeTarget::Likes => "likes",
        }
    }

    pub fn collection(&self) -> &'static str {
        match self {
            NukeTarget::Likes => LIKE_COLLECTION,
            _ => POST_COLLECTION,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            NukeTarget::AllPosts => "ALL of your posts",
            NukeTarget::MediaPosts => "every post with an image or video",
            NukeTarget::TextPosts => "every post without an image or video",
            NukeTarget::Likes => "ALL of your likes",
        }
    }

    /// Whether a listed record is in scope. The content filter only
    /// applies to posts.
    pub fn selects(&self, record: &RepoRecord, filter: &ContentFilter) -> bool {
        match self {
            NukeTarget::Likes => true,
            NukeTarget::AllPosts => filter.matches(&record.labels()),
            NukeTarget::MediaPosts => record.has_media() && filter.matches(&record.labels()),
            NukeTarget::TextPosts => !record.has_media() && filter.matches(&record.labels()),
        }
    }
}

impl fmt::Display for NukeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NukeTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NukeTarget::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| {
                format!("unknown target '{s}' (expected all-posts, media-posts, text-posts or likes)")
            })
    }
}

/// Counts from a completed (or interrupted) deletion run.
#[derive(Debug, Clone, Default)]
pub struct DeleteReport {
    pub listed: usize,
    pub matched: usize,
    pub batch: BatchReport,
}

impl DeleteReport {
    pub fn deleted(&self) -> usize {
        self.batch.succeeded
    }
}

#[derive(Debug)]
pub enum NukeOutcome {
    /// The confirmation did not match. No remote call was made.
    Declined,
    Completed(DeleteReport),
}

/// True when the operator's answer is exactly the target name.
/// Only the trailing line terminator is ignored.
pub fn confirmed(answer: &str, target: NukeTarget) -> bool {
    answer.trim_end_matches(['\r', '\n']) == target.as_str()
}

/// Delete every record `target` selects from the session account.
///
/// `confirm` receives the required phrase and returns what the operator
/// typed. A listing failure aborts before anything is deleted; failed
/// deletions are counted and the run carries on.
pub async fn run<C>(
    graph: &dyn SocialGraph,
    target: NukeTarget,
    filter: &ContentFilter,
    delay: Duration,
    token: &CancellationToken,
    confirm: C,
) -> Result<NukeOutcome>
where
    C: FnOnce(&str) -> Result<String>,
{
    let answer = confirm(target.as_str())?;
    if !confirmed(&answer, target) {
        info!(target_name = target.as_str(), "Deletion not confirmed");
        return Ok(NukeOutcome::Declined);
    }

    let repo = graph.session_did();
    let collection = target.collection();
    println!("Listing {collection} records...");

    let records = match paginate(0, token, |cursor| async move {
        graph
            .list_records(repo, collection, cursor.as_deref(), PAGE_SIZE)
            .await
    })
    .await
    {
        Ok(records) => records,
        Err(FetchError::Cancelled { .. }) => {
            let mut report = DeleteReport::default();
            report.batch.cancelled = true;
            return Ok(NukeOutcome::Completed(report));
        }
        Err(e) => {
            return Err(e).context("Could not list records; no records were deleted");
        }
    };

    let listed = records.len();
    let selected: Vec<(String, RepoRecord)> = records
        .into_iter()
        .filter(|r| target.selects(r, filter))
        .map(|r| (r.rkey().to_string(), r))
        .collect();
    let mut report = DeleteReport {
        listed,
        matched: selected.len(),
        ..DeleteReport::default()
    };
    info!(listed, matched = report.matched, target_name = target.as_str(), "Records selected");

    if selected.is_empty() {
        return Ok(NukeOutcome::Completed(report));
    }

    let pb = ProgressBar::new(selected.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  Deleting [{bar:30}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let policy = RetryPolicy::with_post_delay(delay);
    report.batch = run_sequential(selected, token, &pb, |record| async move {
        let rkey = record.rkey().to_string();
        mutate(&policy, token, &rkey, || {
            graph.delete_record(repo, collection, &rkey)
        })
        .await?;
        anyhow::Ok(())
    })
    .await;
    pb.finish_and_clear();

    if report.batch.cancelled {
        info!(
            deleted = report.deleted(),
            "Deletion interrupted, {} already deleted before interrupt",
            report.deleted()
        );
    }

    Ok(NukeOutcome::Completed(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> RepoRecord {
        RepoRecord {
            uri: "at://did:plc:me/app.bsky.feed.post/3k".to_string(),
            value,
        }
    }

    #[test]
    fn confirmation_must_match_exactly() {
        assert!(confirmed("all-posts\n", NukeTarget::AllPosts));
        assert!(confirmed("likes\r\n", NukeTarget::Likes));
        assert!(!confirmed(" likes", NukeTarget::Likes));
        assert!(!confirmed("LIKES", NukeTarget::Likes));
        assert!(!confirmed("y", NukeTarget::TextPosts));
    }

    #[test]
    fn targets_parse_from_their_names() {
        for target in NukeTarget::ALL {
            assert_eq!(target.as_str().parse::<NukeTarget>(), Ok(target));
        }
        assert!("everything".parse::<NukeTarget>().is_err());
        assert_eq!(NukeTarget::Likes.collection(), LIKE_COLLECTION);
        assert_eq!(NukeTarget::TextPosts.collection(), POST_COLLECTION);
    }

    #[test]
    fn media_and_text_split_on_embeds() {
        let text = record(json!({"text": "hello"}));
        let photo = record(json!({
            "text": "look",
            "embed": {
                "$type": "app.bsky.embed.images",
                "images": [{"image": {"ref": {"$link": "bafy1"}, "mimeType": "image/png"}}]
            }
        }));
        let none = ContentFilter::default();

        assert!(NukeTarget::TextPosts.selects(&text, &none));
        assert!(!NukeTarget::TextPosts.selects(&photo, &none));
        assert!(NukeTarget::MediaPosts.selects(&photo, &none));
        assert!(NukeTarget::AllPosts.selects(&text, &none));
    }

    #[test]
    fn filter_applies_to_posts_but_not_likes() {
        let labelled = record(json!({
            "text": "spicy",
            "labels": {"$type": "com.atproto.label.defs#selfLabels", "values": [{"val": "nudity"}]}
        }));
        let untagged = ContentFilter::new(None, true);
        assert!(!NukeTarget::AllPosts.selects(&labelled, &untagged));
        assert!(NukeTarget::Likes.selects(&labelled, &untagged));
    }
}
