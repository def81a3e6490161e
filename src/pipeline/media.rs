// Media backup: download every photo/video an account has posted.
//
// Lists the author feed, drops reposts and anything the content filter
// rejects, turns each remaining blob into a download task, and runs the
// queue through the windowed batch runner. A failed download is reported
// and the rest of the queue carries on.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::batch::{run_batch, BatchReport, DEFAULT_CONCURRENCY};
use super::filter::{ContentFilter, MediaSelection};
use super::paginate::{paginate, PAGE_SIZE};
use crate::bluesky::models::ContentItem;
use crate::bluesky::traits::SocialGraph;

/// Settings for one backup run.
#[derive(Debug, Clone)]
pub struct MediaSettings {
    pub destination: PathBuf,
    pub selection: MediaSelection,
    pub filter: ContentFilter,
    /// Back up this account instead of the session account.
    pub target: Option<String>,
    pub concurrency: usize,
}

impl MediaSettings {
    pub fn new(destination: PathBuf) -> Self {
        Self {
            destination,
            selection: MediaSelection::All,
            filter: ContentFilter::default(),
            target: None,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// `<Documents>/SkySweep_Backups`, falling back to the home directory.
pub fn default_destination() -> PathBuf {
    dirs::document_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join("Documents")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("SkySweep_Backups")
}

/// One blob to fetch and where to put it.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadTask {
    pub owner_did: String,
    pub cid: String,
    pub file_name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct MediaReport {
    pub posts_found: usize,
    /// Original posts left after dropping reposts and filtering.
    pub posts_selected: usize,
    pub batch: BatchReport,
}

/// Build the download queue for a set of feed items.
///
/// Files are named `<rkey>_<index>.<ext>`, where `index` counts the
/// selected blobs within one post.
pub fn build_queue(
    items: &[ContentItem],
    selection: MediaSelection,
    destination: &Path,
) -> Vec<DownloadTask> {
    let mut queue = Vec::new();
    for item in items {
        let selected = item.media.iter().filter(|m| selection.includes(m.kind));
        for (index, media) in selected.enumerate() {
            let file_name = format!("{}_{}.{}", item.rkey(), index, media.extension());
            queue.push(DownloadTask {
                owner_did: item.author_did.clone(),
                cid: media.cid.clone(),
                path: destination.join(&file_name),
                file_name,
            });
        }
    }
    queue
}

/// Keep original posts the filter accepts.
pub fn select_posts(items: Vec<ContentItem>, filter: &ContentFilter) -> Vec<ContentItem> {
    items
        .into_iter()
        .filter(|item| !item.is_repost && filter.matches(&item.labels))
        .collect()
}

/// Run a media backup.
///
/// Fails only if the feed listing or the destination directory fails;
/// individual downloads are reported in the returned batch.
pub async fn backup(
    graph: &dyn SocialGraph,
    settings: &MediaSettings,
    token: &CancellationToken,
) -> Result<MediaReport> {
    let actor = settings.target.as_deref().unwrap_or(graph.session_did());
    println!("Starting media download for @{actor}...");

    tokio::fs::create_dir_all(&settings.destination)
        .await
        .with_context(|| format!("Failed to create {}", settings.destination.display()))?;

    let posts = paginate(0, token, |cursor| async move {
        graph
            .list_authored_content(actor, cursor.as_deref(), PAGE_SIZE)
            .await
    })
    .await
    .with_context(|| format!("Could not fetch posts for @{actor}; nothing was downloaded"))?;

    let mut report = MediaReport {
        posts_found: posts.len(),
        ..MediaReport::default()
    };
    let selected = select_posts(posts, &settings.filter);
    report.posts_selected = selected.len();
    info!(
        found = report.posts_found,
        selected = report.posts_selected,
        "Collected posts"
    );

    let queue = build_queue(&selected, settings.selection, &settings.destination);
    if queue.is_empty() {
        return Ok(report);
    }

    println!(
        "Found {} media file(s). Downloading {} at a time...",
        queue.len(),
        settings.concurrency
    );

    let pb = ProgressBar::new(queue.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  Downloading [{bar:30}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let tasks = queue
        .into_iter()
        .map(|task| (task.file_name.clone(), task))
        .collect();

    report.batch = run_batch(tasks, settings.concurrency, token, &pb, |task| async move {
        let bytes = graph.fetch_blob(&task.owner_did, &task.cid).await?;
        tokio::fs::write(&task.path, bytes)
            .await
            .with_context(|| format!("Failed to write {}", task.path.display()))?;
        anyhow::Ok(())
    })
    .await;
    pb.finish_and_clear();

    Ok(report)
}
