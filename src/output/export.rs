// Export of matched profiles as a delimited table or pretty JSON.
//
// Both encodings are pure functions of the row sequence and keep row
// order. Only `write_export` touches the filesystem.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;

use crate::bluesky::models::Profile;
use crate::scoring::signals::{follow_ratio, format_ratio};
use crate::scoring::verdict::{Category, Verdict};

/// One matched profile, as exported. Field order is column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub handle: String,
    pub id: String,
    pub followers: u64,
    pub following: u64,
    pub posts: u64,
    /// Follower ratio with three decimals.
    pub ratio: String,
    pub category: Category,
    pub reason: String,
}

impl ExportRow {
    pub fn new(profile: &Profile, verdict: &Verdict) -> Self {
        Self {
            handle: profile.handle.clone(),
            id: profile.did.clone(),
            followers: profile.followers_count,
            following: profile.follows_count,
            posts: profile.posts_count,
            ratio: format_ratio(follow_ratio(
                profile.followers_count,
                profile.follows_count,
            )),
            category: verdict.category,
            reason: verdict.reason(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn encode(&self, rows: &[ExportRow]) -> Result<String> {
        match self {
            ExportFormat::Csv => to_csv(rows),
            ExportFormat::Json => to_json(rows),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("unknown export format '{other}' (expected csv or json)")),
        }
    }
}

/// Comma-delimited table with a header row.
///
/// Fields containing a comma, quote or newline are quoted, with embedded
/// quotes doubled.
pub fn to_csv(rows: &[ExportRow]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    if rows.is_empty() {
        writer.write_record(COLUMNS)?;
    }
    for row in rows {
        writer.serialize(row).context("Failed to encode CSV row")?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output was not UTF-8")
}

/// Pretty-printed JSON array of row objects.
pub fn to_json(rows: &[ExportRow]) -> Result<String> {
    serde_json::to_string_pretty(rows).context("Failed to encode JSON export")
}

const COLUMNS: [&str; 8] = [
    "handle",
    "id",
    "followers",
    "following",
    "posts",
    "ratio",
    "category",
    "reason",
];

/// `skysweep-suspects-YYYYmmdd-HHMMSS.<ext>`
pub fn default_file_name(format: ExportFormat, now: DateTime<Local>) -> String {
    format!(
        "skysweep-suspects-{}.{}",
        now.format("%Y%m%d-%H%M%S"),
        format.extension()
    )
}

/// Replace anything outside `[A-Za-z0-9_.-]` with `_` and cap the length.
pub fn safe_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .take(120)
        .collect()
}

/// Encode `rows` and write them next to `path`'s parent, sanitizing the
/// file name. Returns the path written.
pub async fn write_export(
    path: Option<&Path>,
    format: ExportFormat,
    rows: &[ExportRow],
) -> Result<PathBuf> {
    let requested = match path {
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(default_file_name(format, Local::now())),
    };
    let file_name = requested
        .file_name()
        .map(|n| safe_filename(&n.to_string_lossy()))
        .unwrap_or_else(|| default_file_name(format, Local::now()));
    let target = requested.with_file_name(file_name);

    let data = format.encode(rows)?;
    tokio::fs::write(&target, data)
        .await
        .with_context(|| format!("Failed to write export file {}", target.display()))?;
    Ok(target)
}
