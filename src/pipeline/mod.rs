// Pipelines: the drivers that walk remote collections and act on them.
//
// `scan` classifies followers and optionally blocks matches, `media`
// backs up blobs through the bounded batch runner, `nuke` deletes records
// one at a time behind a typed confirmation. All of them share the
// paginator, the retrying mutator, and the cancellable pause below.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

pub mod batch;
pub mod filter;
pub mod media;
pub mod nuke;
pub mod paginate;
pub mod scan;
pub mod throttle;

/// Sleep for `delay` unless the token fires first.
///
/// Returns `false` when cancelled, so loops can stop issuing new calls.
pub async fn pause(delay: Duration, token: &CancellationToken) -> bool {
    if delay.is_zero() {
        return !token.is_cancelled();
    }
    tokio::select! {
        biased;
        _ = token.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}
