// Colored terminal output for scan matches and run summaries.
//
// Library code reports through these helpers so every workflow prints
// in one consistent style. Nothing here affects control flow.

use colored::Colorize;

use crate::bluesky::models::Profile;
use crate::config::ScanAction;
use crate::pipeline::batch::BatchReport;
use crate::pipeline::media::MediaReport;
use crate::pipeline::nuke::{DeleteReport, NukeTarget};
use crate::pipeline::scan::ScanReport;
use crate::scoring::signals::{follow_ratio, format_ratio};
use crate::scoring::verdict::{Category, Verdict};

fn colorize_category(category: Category) -> colored::ColoredString {
    match category {
        Category::Bot => "bot".red().bold(),
        Category::Marketer => "marketer".yellow().bold(),
        Category::None => "none".dimmed(),
    }
}

fn ratio_of(profile: &Profile) -> String {
    format_ratio(follow_ratio(profile.followers_count, profile.follows_count))
}

/// One metrics line per scanned profile (verbose mode).
pub fn display_profile_metrics(profile: &Profile, verdict: &Verdict) {
    let status = if verdict.is_match() {
        format!("MATCH {}", colorize_category(verdict.category))
    } else {
        "ok".green().to_string()
    };
    println!(
        "  {} @{:<32} follows {:>6}  followers {:>6}  posts {:>6}  ratio {}  score {:>3}  {}",
        "·".dimmed(),
        profile.handle,
        profile.follows_count,
        profile.followers_count,
        profile.posts_count,
        ratio_of(profile),
        verdict.score,
        status,
    );
}

fn display_match(marker: colored::ColoredString, profile: &Profile, verdict: &Verdict) {
    println!(
        "  {} @{} [{} {}] {}",
        marker,
        profile.handle,
        colorize_category(verdict.category),
        verdict.score,
        verdict.reason().dimmed(),
    );
}

/// Review mode: a match that is only reported.
pub fn display_suspect(profile: &Profile, verdict: &Verdict) {
    display_match("?".yellow().bold(), profile, verdict);
}

/// Simulation mode: a match that would have been blocked.
pub fn display_would_block(profile: &Profile, verdict: &Verdict) {
    display_match("would block".cyan(), profile, verdict);
}

pub fn display_blocked(profile: &Profile, verdict: &Verdict) {
    display_match("blocked".red().bold(), profile, verdict);
}

pub fn display_block_cap(max_blocks: usize) {
    println!(
        "  {} Block limit of {} reached; remaining matches are reported only.",
        "!".yellow().bold(),
        max_blocks
    );
}

/// Wording for the blocks line of the scan summary.
pub fn blocks_summary(action: ScanAction, actioned: usize) -> String {
    match action {
        ScanAction::AutoBlock => format!("blocked {actioned}"),
        ScanAction::Simulate => "blocked 0 (simulation)".to_string(),
        ScanAction::Review => "no blocks (review mode)".to_string(),
    }
}

pub fn display_scan_summary(report: &ScanReport, action: ScanAction) {
    let title = if report.cancelled {
        "=== Scan interrupted ==="
    } else {
        "=== Scan complete ==="
    };
    println!("\n{}", title.bold());
    println!(
        "  Scanned {} of {} follower(s), flagged {}, {}",
        report.scanned,
        report.listed,
        report.flagged,
        blocks_summary(action, report.actioned),
    );
    if report.block_failures > 0 {
        println!("  {} {} block(s) failed", "!".red(), report.block_failures);
    }
    if report.lookup_failures > 0 {
        println!(
            "  {} {} profile lookup(s) failed and were skipped",
            "~".yellow(),
            report.lookup_failures
        );
    }
    if report.cap_reached {
        println!("  {} Block limit reached during this run", "~".yellow());
    }
}

fn display_failures(batch: &BatchReport) {
    for failure in batch.failures() {
        println!(
            "    {} {} {}",
            "x".red(),
            failure.id,
            failure.error.as_deref().unwrap_or("").dimmed()
        );
    }
}

pub fn display_media_summary(report: &MediaReport, destination: &std::path::Path) {
    println!("\n{}", "=== Media backup ===".bold());
    println!(
        "  Posts found: {}  selected: {}",
        report.posts_found, report.posts_selected
    );
    if report.batch.total == 0 {
        println!("  No media found to download.");
        return;
    }
    println!(
        "  {} saved, {} failed{}",
        report.batch.succeeded.to_string().green(),
        report.batch.failed.to_string().red(),
        if report.batch.cancelled {
            format!(", {} not started (interrupted)", report.batch.skipped())
        } else {
            String::new()
        }
    );
    display_failures(&report.batch);
    println!("  Files are in {}", destination.display());
}

/// Banner shown before the confirmation prompt.
pub fn display_nuke_warning(target: NukeTarget) {
    println!();
    println!("{}", "!!! DESTRUCTIVE OPERATION !!!".red().bold());
    println!(
        "  This will permanently delete {} from your account.",
        target.description()
    );
    println!("  Deleted records cannot be recovered.");
    println!("  Any answer other than the exact target name cancels.");
}

pub fn display_delete_summary(report: &DeleteReport) {
    println!("\n{}", "=== Delete summary ===".bold());
    println!(
        "  Listed {}, matched {}, deleted {}, failed {}",
        report.listed,
        report.matched,
        report.batch.succeeded.to_string().green(),
        report.batch.failed.to_string().red(),
    );
    if report.batch.cancelled {
        println!(
            "  {} Interrupted: {} already deleted before interrupt",
            "!".yellow().bold(),
            report.batch.succeeded
        );
    }
    display_failures(&report.batch);
}
