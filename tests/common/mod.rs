// In-memory SocialGraph for pipeline tests.
//
// Collections are served in pages of `page_size` with the next offset as
// the cursor. Every call is appended to `calls` so tests can assert on
// exactly what reached the remote.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use skysweep::bluesky::error::RemoteError;
use skysweep::bluesky::models::{ContentItem, Page, Profile, RepoRecord};
use skysweep::bluesky::traits::SocialGraph;

pub const SELF_DID: &str = "did:plc:self";

#[derive(Default)]
pub struct FakeGraph {
    pub page_size: usize,
    pub followers: Vec<Profile>,
    /// Full profiles by DID. Missing DIDs fail with NotFound.
    pub profiles: HashMap<String, Profile>,
    pub content: Vec<ContentItem>,
    pub records: HashMap<String, Vec<RepoRecord>>,
    pub blobs: HashMap<String, Vec<u8>>,
    /// Fail the listing at this page index (0-based).
    pub fail_listing_at: Option<usize>,
    /// Errors returned by successive block attempts on a DID before success.
    pub block_errors: Mutex<HashMap<String, VecDeque<RemoteError>>>,
    /// Record keys whose deletion always fails.
    pub undeletable: Vec<String>,
    pub calls: Mutex<Vec<String>>,
    /// Cancel this token as soon as a call with the given prefix arrives.
    pub cancel_on: Option<(String, CancellationToken)>,
}

impl FakeGraph {
    pub fn new() -> Self {
        Self {
            page_size: 2,
            ..Self::default()
        }
    }

    /// Add a follower whose full profile is also resolvable.
    pub fn with_follower(mut self, profile: Profile) -> Self {
        let stub = Profile {
            did: profile.did.clone(),
            handle: profile.handle.clone(),
            ..Profile::default()
        };
        self.followers.push(stub);
        self.profiles.insert(profile.did.clone(), profile);
        self
    }

    pub fn fail_blocks(self, did: &str, errors: Vec<RemoteError>) -> Self {
        self.block_errors
            .lock()
            .unwrap()
            .insert(did.to_string(), errors.into());
        self
    }

    pub fn cancel_on_call(mut self, prefix: &str, token: &CancellationToken) -> Self {
        self.cancel_on = Some((prefix.to_string(), token.clone()));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    fn log(&self, call: String) {
        if let Some((prefix, token)) = &self.cancel_on {
            if call.starts_with(prefix.as_str()) {
                token.cancel();
            }
        }
        self.calls.lock().unwrap().push(call);
    }

    fn page<T: Clone>(&self, items: &[T], cursor: Option<&str>) -> Result<Page<T>, RemoteError> {
        let start: usize = cursor.map(|c| c.parse().unwrap()).unwrap_or(0);
        let size = self.page_size.max(1);
        if self.fail_listing_at == Some(start / size) {
            return Err(RemoteError::Permanent("listing exploded".to_string()));
        }
        let end = (start + size).min(items.len());
        let next = (end < items.len()).then(|| end.to_string());
        Ok(Page::new(items[start..end].to_vec(), next))
    }
}

#[async_trait]
impl SocialGraph for FakeGraph {
    fn session_did(&self) -> &str {
        SELF_DID
    }

    async fn list_followers(
        &self,
        actor: &str,
        cursor: Option<&str>,
        _page_size: u8,
    ) -> Result<Page<Profile>, RemoteError> {
        self.log(format!("list_followers {actor} {}", cursor.unwrap_or("-")));
        self.page(&self.followers, cursor)
    }

    async fn get_profile(&self, actor: &str) -> Result<Profile, RemoteError> {
        self.log(format!("get_profile {actor}"));
        self.profiles
            .get(actor)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(format!("Profile not found: {actor}")))
    }

    async fn list_authored_content(
        &self,
        actor: &str,
        cursor: Option<&str>,
        _page_size: u8,
    ) -> Result<Page<ContentItem>, RemoteError> {
        self.log(format!("list_authored_content {actor}"));
        self.page(&self.content, cursor)
    }

    async fn list_records(
        &self,
        repo: &str,
        collection: &str,
        cursor: Option<&str>,
        _page_size: u8,
    ) -> Result<Page<RepoRecord>, RemoteError> {
        self.log(format!("list_records {repo} {collection}"));
        let records = self.records.get(collection).cloned().unwrap_or_default();
        self.page(&records, cursor)
    }

    async fn create_block(&self, self_did: &str, target_did: &str) -> Result<(), RemoteError> {
        self.log(format!("create_block {self_did} {target_did}"));
        let mut pending = self.block_errors.lock().unwrap();
        match pending.get_mut(target_did).and_then(|q| q.pop_front()) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn delete_record(
        &self,
        repo: &str,
        collection: &str,
        rkey: &str,
    ) -> Result<(), RemoteError> {
        self.log(format!("delete_record {repo} {collection} {rkey}"));
        if self.undeletable.iter().any(|r| r == rkey) {
            return Err(RemoteError::Permanent("InvalidRequest".to_string()));
        }
        Ok(())
    }

    async fn fetch_blob(&self, owner_did: &str, cid: &str) -> Result<Vec<u8>, RemoteError> {
        self.log(format!("fetch_blob {owner_did} {cid}"));
        self.blobs
            .get(cid)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(format!("Blob not found: {cid}")))
    }
}

pub fn profile(handle: &str, bio: &str, follows: u64, followers: u64, posts: u64) -> Profile {
    Profile {
        did: format!("did:plc:{}", handle.split('.').next().unwrap_or(handle)),
        handle: handle.to_string(),
        display_name: None,
        description: Some(bio.to_string()),
        avatar: Some("https://cdn.example/avatar.jpg".to_string()),
        follows_count: follows,
        followers_count: followers,
        posts_count: posts,
    }
}

/// An unmistakable bot: mass-following, empty, generic handle.
pub fn bot(handle: &str) -> Profile {
    Profile {
        description: None,
        avatar: None,
        ..profile(handle, "", 5000, 10, 1)
    }
}

pub fn human(handle: &str) -> Profile {
    profile(handle, "Birds, bikes and bad puns.", 200, 1800, 500)
}
