// The remote social graph, as SkySweep sees it.
//
// Pipelines depend only on this trait, so the XRPC client can be swapped
// for an in-memory fake in tests.

use async_trait::async_trait;

use super::error::RemoteError;
use super::models::{ContentItem, Page, Profile, RepoRecord};

/// Collection holding post records.
pub const POST_COLLECTION: &str = "app.bsky.feed.post";
/// Collection holding like records.
pub const LIKE_COLLECTION: &str = "app.bsky.feed.like";
/// Collection holding block records.
pub const BLOCK_COLLECTION: &str = "app.bsky.graph.block";

/// Operations against an authenticated session.
#[async_trait]
pub trait SocialGraph: Send + Sync {
    /// DID of the authenticated account. Block and delete calls act on its repo.
    fn session_did(&self) -> &str;

    async fn list_followers(
        &self,
        actor: &str,
        cursor: Option<&str>,
        page_size: u8,
    ) -> Result<Page<Profile>, RemoteError>;

    /// Full profile with counts. Follower pages carry no counts.
    async fn get_profile(&self, actor: &str) -> Result<Profile, RemoteError>;

    async fn list_authored_content(
        &self,
        actor: &str,
        cursor: Option<&str>,
        page_size: u8,
    ) -> Result<Page<ContentItem>, RemoteError>;

    async fn list_records(
        &self,
        repo: &str,
        collection: &str,
        cursor: Option<&str>,
        page_size: u8,
    ) -> Result<Page<RepoRecord>, RemoteError>;

    async fn create_block(&self, self_did: &str, target_did: &str) -> Result<(), RemoteError>;

    async fn delete_record(
        &self,
        repo: &str,
        collection: &str,
        rkey: &str,
    ) -> Result<(), RemoteError>;

    async fn fetch_blob(&self, owner_did: &str, cid: &str) -> Result<Vec<u8>, RemoteError>;
}
