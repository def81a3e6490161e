// Data types exchanged with the remote social graph.
//
// These are the narrow, typed views the rest of SkySweep works with. The
// XRPC client converts wire responses into them; the scan and cleanup
// pipelines never touch raw JSON except for record values, which are
// inspected through the helpers at the bottom of this file.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The public attributes of an account that classification consumes.
///
/// Counts that the remote omits are stored as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub did: String,
    pub handle: String,
    pub display_name: Option<String>,
    /// Profile bio text.
    pub description: Option<String>,
    /// Avatar URL, if one is set.
    pub avatar: Option<String>,
    pub followers_count: u64,
    pub follows_count: u64,
    pub posts_count: u64,
}

/// One page of a cursor-based remote collection.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Continuation token; `None` (or empty) means this was the last page.
    pub cursor: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, cursor: Option<String>) -> Self {
        Self { items, cursor }
    }

    /// A terminal page with no continuation.
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            cursor: None,
        }
    }
}

/// Whether a media blob is a still image or a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Video,
}

/// A blob attached to a post, addressable via `fetch_blob(owner, cid)`.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRef {
    pub cid: String,
    pub mime_type: Option<String>,
    pub kind: MediaKind,
}

impl MediaRef {
    /// File extension derived from the mime subtype (`image/png` -> `png`).
    pub fn extension(&self) -> String {
        if let Some(subtype) = self
            .mime_type
            .as_deref()
            .and_then(|m| m.split_once('/'))
            .map(|(_, sub)| sub)
            .filter(|sub| !sub.is_empty())
        {
            return subtype.to_string();
        }
        match self.kind {
            MediaKind::Photo => "jpg".to_string(),
            MediaKind::Video => "mp4".to_string(),
        }
    }
}

/// An item from an account's authored feed.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentItem {
    pub uri: String,
    pub author_did: String,
    /// True when the feed entry is someone else's post reposted by the author.
    pub is_repost: bool,
    /// Moderation labels and self-labels combined.
    pub labels: Vec<String>,
    pub media: Vec<MediaRef>,
}

impl ContentItem {
    pub fn rkey(&self) -> &str {
        rkey_from_uri(&self.uri)
    }
}

/// A raw record from `com.atproto.repo.listRecords`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RepoRecord {
    pub uri: String,
    pub value: Value,
}

impl RepoRecord {
    pub fn rkey(&self) -> &str {
        rkey_from_uri(&self.uri)
    }

    /// True when the record embeds at least one image or a video.
    pub fn has_media(&self) -> bool {
        !media_from_record(&self.value).is_empty()
    }

    /// Self-labels declared on the record.
    pub fn labels(&self) -> Vec<String> {
        self_labels(&self.value)
    }
}

/// The record key is the last path segment of an AT URI.
pub fn rkey_from_uri(uri: &str) -> &str {
    uri.rsplit('/').next().unwrap_or(uri)
}

/// Extract blob references from a post record's `embed`.
///
/// Handles plain image/video embeds and the `recordWithMedia` wrapper,
/// where the media sits one level deeper under `embed.media`.
pub fn media_from_record(record: &Value) -> Vec<MediaRef> {
    let Some(embed) = record.get("embed") else {
        return Vec::new();
    };
    let mut media = Vec::new();
    collect_media(embed, &mut media);
    if let Some(inner) = embed.get("media") {
        collect_media(inner, &mut media);
    }
    media
}

fn collect_media(embed: &Value, out: &mut Vec<MediaRef>) {
    if let Some(images) = embed.get("images").and_then(Value::as_array) {
        for image in images {
            if let Some(media) = blob_ref(image.get("image"), MediaKind::Photo) {
                out.push(media);
            }
        }
    }
    if let Some(media) = blob_ref(embed.get("video"), MediaKind::Video) {
        out.push(media);
    }
}

fn blob_ref(blob: Option<&Value>, kind: MediaKind) -> Option<MediaRef> {
    let blob = blob?;
    let cid = blob
        .get("ref")
        .and_then(|r| r.get("$link"))
        .and_then(Value::as_str)
        // Legacy blobs carry the CID directly.
        .or_else(|| blob.get("cid").and_then(Value::as_str))?;
    Some(MediaRef {
        cid: cid.to_string(),
        mime_type: blob
            .get("mimeType")
            .and_then(Value::as_str)
            .map(str::to_string),
        kind,
    })
}

/// Self-label values from `record.labels.values[].val`.
pub fn self_labels(record: &Value) -> Vec<String> {
    record
        .get("labels")
        .and_then(|l| l.get("values"))
        .and_then(Value::as_array)
        .map(|values| label_values(values))
        .unwrap_or_default()
}

/// `val` fields from a list of label objects.
pub fn label_values(labels: &[Value]) -> Vec<String> {
    labels
        .iter()
        .filter_map(|l| l.get("val").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}
