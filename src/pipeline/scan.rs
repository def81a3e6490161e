// Follower scan: list -> look up -> classify -> act.
//
// Walks the follower list of the session account (or a target), fetches
// each full profile, classifies it, and for every match records an export
// row and takes exactly one action: log it (review), log what would be
// blocked (simulate), or block it (auto-block, capped per run).
//
// Items are processed one after another in listing order.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::paginate::{paginate, FetchError, PAGE_SIZE};
use super::pause;
use super::throttle::{mutate, RetryPolicy};
use crate::bluesky::traits::SocialGraph;
use crate::config::{ScanAction, ScanSettings};
use crate::output::export::ExportRow;
use crate::output::terminal;
use crate::scoring::verdict::evaluate;

/// Counters and matched rows from one scan.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Follower entries returned by the listing.
    pub listed: usize,
    /// Profiles fetched and classified.
    pub scanned: usize,
    pub flagged: usize,
    /// Successful blocks.
    pub actioned: usize,
    pub block_failures: usize,
    pub lookup_failures: usize,
    /// True once a match was skipped because `max_blocks` was reached.
    pub cap_reached: bool,
    pub cancelled: bool,
    /// Export rows in match order.
    pub rows: Vec<ExportRow>,
}

/// Run a follower scan.
///
/// A listing failure aborts the scan with nothing classified. Per-profile
/// lookup failures and failed blocks are counted and skipped.
pub async fn run(
    graph: &dyn SocialGraph,
    settings: &ScanSettings,
    token: &CancellationToken,
) -> Result<ScanReport, FetchError> {
    let self_did = graph.session_did();
    let actor = settings.target.as_deref().unwrap_or(self_did);
    let mut report = ScanReport::default();

    println!("Scanning followers of @{actor}...");

    let followers = match paginate(settings.pages, token, |cursor| async move {
        graph
            .list_followers(actor, cursor.as_deref(), PAGE_SIZE)
            .await
    })
    .await
    {
        Ok(followers) => followers,
        Err(FetchError::Cancelled { pages }) => {
            info!(pages, "Scan cancelled while listing followers");
            report.cancelled = true;
            return Ok(report);
        }
        Err(e) => return Err(e),
    };

    report.listed = followers.len();
    info!(count = followers.len(), actor = actor, "Collected followers");
    println!("Fetched {} follower(s). Checking profiles...", followers.len());

    let block_policy = RetryPolicy::with_post_delay(settings.block_delay);

    for follower in &followers {
        if token.is_cancelled() {
            report.cancelled = true;
            break;
        }

        let lookup = graph.get_profile(&follower.did).await;

        // Failed lookups are spaced like successful ones.
        if !pause(settings.profile_delay, token).await {
            if lookup.is_err() {
                report.lookup_failures += 1;
            }
            report.cancelled = true;
            break;
        }

        let profile = match lookup {
            Ok(profile) => profile,
            Err(e) => {
                warn!(handle = follower.handle, error = %e, "Could not fetch profile, skipping");
                report.lookup_failures += 1;
                continue;
            }
        };

        let verdict = evaluate(&profile, settings.mode, &settings.thresholds);
        report.scanned += 1;

        if settings.verbose {
            terminal::display_profile_metrics(&profile, &verdict);
        }

        if !verdict.is_match() {
            continue;
        }

        report.flagged += 1;
        report.rows.push(ExportRow::new(&profile, &verdict));

        match settings.action {
            ScanAction::Simulate => terminal::display_would_block(&profile, &verdict),
            ScanAction::Review => terminal::display_suspect(&profile, &verdict),
            ScanAction::AutoBlock => {
                if report.actioned < settings.max_blocks {
                    let label = format!("@{}", profile.handle);
                    let blocked = mutate(&block_policy, token, &label, || {
                        graph.create_block(self_did, &profile.did)
                    })
                    .await;
                    match blocked {
                        Ok(()) => {
                            report.actioned += 1;
                            terminal::display_blocked(&profile, &verdict);
                        }
                        Err(e) => {
                            report.block_failures += 1;
                            warn!(handle = profile.handle, error = %e, "Block failed");
                        }
                    }
                } else if !report.cap_reached {
                    report.cap_reached = true;
                    terminal::display_block_cap(settings.max_blocks);
                }
            }
        }
    }

    if report.cancelled {
        info!(scanned = report.scanned, "Scan interrupted");
    }

    Ok(report)
}
