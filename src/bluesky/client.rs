// Authenticated AT Protocol client: XRPC over HTTP.
//
// A thin reqwest wrapper with generic XRPC GET/POST helpers, plus the
// `SocialGraph` implementation the pipelines run against. Every HTTP
// failure is folded into a `RemoteError` so the retry wrapper can tell
// transient from terminal failures.

use async_trait::async_trait;
use atrium_api::app::bsky::actor::get_profile;
use atrium_api::app::bsky::graph::get_followers;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::error::RemoteError;
use super::models::{
    label_values, media_from_record, self_labels, ContentItem, Page, Profile, RepoRecord,
};
use super::traits::{SocialGraph, BLOCK_COLLECTION};

/// Default service for app-password logins.
pub const DEFAULT_SERVICE_URL: &str = "https://bsky.social";

/// The authenticated account behind a client.
#[derive(Debug, Clone)]
pub struct Session {
    pub did: String,
    pub handle: String,
    access_jwt: String,
}

/// HTTP client bound to one authenticated session.
pub struct AtpClient {
    client: reqwest::Client,
    base_url: String,
    session: Session,
}

impl AtpClient {
    /// Log in with a handle (or email) and app password.
    ///
    /// A bare handle without a dot is treated as a `.bsky.social` handle.
    pub async fn authenticate(
        base_url: &str,
        identifier: &str,
        secret: &str,
    ) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .user_agent("skysweep/0.1")
            .build()
            .map_err(|e| RemoteError::Permanent(format!("failed to build HTTP client: {e}")))?;
        let base_url = base_url.trim_end_matches('/').to_string();
        let identifier = normalize_identifier(identifier);

        let response = client
            .post(format!("{base_url}/xrpc/com.atproto.server.createSession"))
            .json(&json!({ "identifier": identifier, "password": secret }))
            .send()
            .await
            .map_err(transport_error)?;

        let created: CreateSessionResponse = match read_json(response).await {
            Ok(created) => created,
            // A rejected login comes back as 400/401 with AuthenticationRequired.
            Err(RemoteError::Permanent(msg)) | Err(RemoteError::Auth(msg)) => {
                return Err(RemoteError::Auth(msg))
            }
            Err(e) => return Err(e),
        };

        debug!(did = created.did, "Session created");

        Ok(Self {
            client,
            base_url,
            session: Session {
                did: created.did,
                handle: created.handle,
                access_jwt: created.access_jwt,
            },
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// GET an XRPC query and deserialize the response.
    pub async fn xrpc_get<T: DeserializeOwned>(
        &self,
        nsid: &str,
        params: &[(&str, &str)],
    ) -> Result<T, RemoteError> {
        debug!(nsid = nsid, "XRPC GET request");
        let response = self
            .client
            .get(format!("{}/xrpc/{}", self.base_url, nsid))
            .bearer_auth(&self.session.access_jwt)
            .query(params)
            .send()
            .await
            .map_err(transport_error)?;
        read_json(response).await
    }

    /// POST an XRPC procedure. The response body is ignored.
    pub async fn xrpc_post<B: Serialize + ?Sized>(
        &self,
        nsid: &str,
        body: &B,
    ) -> Result<(), RemoteError> {
        debug!(nsid = nsid, "XRPC POST request");
        let response = self
            .client
            .post(format!("{}/xrpc/{}", self.base_url, nsid))
            .bearer_auth(&self.session.access_jwt)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        check_status(response).await.map(|_| ())
    }
}

#[async_trait]
impl SocialGraph for AtpClient {
    fn session_did(&self) -> &str {
        &self.session.did
    }

    async fn list_followers(
        &self,
        actor: &str,
        cursor: Option<&str>,
        page_size: u8,
    ) -> Result<Page<Profile>, RemoteError> {
        let limit = page_size.to_string();
        let mut params = vec![("actor", actor), ("limit", limit.as_str())];
        if let Some(c) = cursor {
            params.push(("cursor", c));
        }
        let output: get_followers::Output =
            self.xrpc_get("app.bsky.graph.getFollowers", &params).await?;

        let items = output
            .followers
            .iter()
            .map(|f| Profile {
                did: f.did.as_str().to_string(),
                handle: f.handle.as_str().to_string(),
                display_name: f.display_name.clone(),
                description: f.description.clone(),
                avatar: f.avatar.clone(),
                ..Profile::default()
            })
            .collect();
        Ok(Page::new(items, output.cursor.clone()))
    }

    async fn get_profile(&self, actor: &str) -> Result<Profile, RemoteError> {
        let p: get_profile::Output = self
            .xrpc_get("app.bsky.actor.getProfile", &[("actor", actor)])
            .await?;
        Ok(Profile {
            did: p.did.as_str().to_string(),
            handle: p.handle.as_str().to_string(),
            display_name: p.display_name.clone(),
            description: p.description.clone(),
            avatar: p.avatar.clone(),
            followers_count: count(p.followers_count),
            follows_count: count(p.follows_count),
            posts_count: count(p.posts_count),
        })
    }

    async fn list_authored_content(
        &self,
        actor: &str,
        cursor: Option<&str>,
        page_size: u8,
    ) -> Result<Page<ContentItem>, RemoteError> {
        let limit = page_size.to_string();
        let mut params = vec![("actor", actor), ("limit", limit.as_str())];
        if let Some(c) = cursor {
            params.push(("cursor", c));
        }
        let output: AuthorFeedResponse =
            self.xrpc_get("app.bsky.feed.getAuthorFeed", &params).await?;

        let items = output
            .feed
            .into_iter()
            .map(|entry| {
                let mut labels = label_values(&entry.post.labels);
                for label in self_labels(&entry.post.record) {
                    if !labels.contains(&label) {
                        labels.push(label);
                    }
                }
                ContentItem {
                    media: media_from_record(&entry.post.record),
                    uri: entry.post.uri,
                    author_did: entry.post.author.did,
                    is_repost: entry.reason.is_some(),
                    labels,
                }
            })
            .collect();
        Ok(Page::new(items, output.cursor))
    }

    async fn list_records(
        &self,
        repo: &str,
        collection: &str,
        cursor: Option<&str>,
        page_size: u8,
    ) -> Result<Page<RepoRecord>, RemoteError> {
        let limit = page_size.to_string();
        let mut params = vec![
            ("repo", repo),
            ("collection", collection),
            ("limit", limit.as_str()),
        ];
        if let Some(c) = cursor {
            params.push(("cursor", c));
        }
        let output: ListRecordsResponse =
            self.xrpc_get("com.atproto.repo.listRecords", &params).await?;
        Ok(Page::new(output.records, output.cursor))
    }

    async fn create_block(&self, self_did: &str, target_did: &str) -> Result<(), RemoteError> {
        self.xrpc_post(
            "com.atproto.repo.createRecord",
            &json!({
                "repo": self_did,
                "collection": BLOCK_COLLECTION,
                "record": {
                    "$type": BLOCK_COLLECTION,
                    "subject": target_did,
                    "createdAt": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
                },
            }),
        )
        .await
    }

    async fn delete_record(
        &self,
        repo: &str,
        collection: &str,
        rkey: &str,
    ) -> Result<(), RemoteError> {
        self.xrpc_post(
            "com.atproto.repo.deleteRecord",
            &json!({ "repo": repo, "collection": collection, "rkey": rkey }),
        )
        .await
    }

    async fn fetch_blob(&self, owner_did: &str, cid: &str) -> Result<Vec<u8>, RemoteError> {
        let response = self
            .client
            .get(format!("{}/xrpc/com.atproto.sync.getBlob", self.base_url))
            .bearer_auth(&self.session.access_jwt)
            .query(&[("did", owner_did), ("cid", cid)])
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status(response).await?;
        let bytes = response.bytes().await.map_err(transport_error)?;
        Ok(bytes.to_vec())
    }
}

/// Append `.bsky.social` to a bare handle. Emails and full handles pass through.
pub fn normalize_identifier(identifier: &str) -> String {
    let trimmed = identifier.trim().trim_start_matches('@');
    if trimmed.is_empty() || trimmed.contains('.') || trimmed.contains('@') {
        trimmed.to_string()
    } else {
        format!("{trimmed}.bsky.social")
    }
}

/// Map an HTTP status and error body to the failure taxonomy.
pub fn classify_status(status: StatusCode, body: &str) -> RemoteError {
    let detail = format!("{status}: {body}");
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        return RemoteError::Transient(detail);
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return RemoteError::Auth(detail);
    }
    let error_name = serde_json::from_str::<XrpcErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .unwrap_or_default();
    if status == StatusCode::NOT_FOUND || error_name.ends_with("NotFound") {
        return RemoteError::NotFound(detail);
    }
    RemoteError::Permanent(detail)
}

fn count(value: Option<i64>) -> u64 {
    value.unwrap_or(0).max(0) as u64
}

fn transport_error(err: reqwest::Error) -> RemoteError {
    if err.is_timeout() || err.is_connect() {
        RemoteError::Transient(err.to_string())
    } else {
        RemoteError::Permanent(err.to_string())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(classify_status(status, &body))
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, RemoteError> {
    let response = check_status(response).await?;
    response
        .json::<T>()
        .await
        .map_err(|e| RemoteError::Permanent(format!("failed to deserialize response: {e}")))
}

// -- Serde types for XRPC responses not covered by atrium-api --

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionResponse {
    access_jwt: String,
    did: String,
    handle: String,
}

#[derive(Deserialize)]
struct XrpcErrorBody {
    error: Option<String>,
}

#[derive(Deserialize)]
struct ListRecordsResponse {
    records: Vec<RepoRecord>,
    cursor: Option<String>,
}

#[derive(Deserialize)]
struct AuthorFeedResponse {
    feed: Vec<FeedViewPost>,
    cursor: Option<String>,
}

#[derive(Deserialize)]
struct FeedViewPost {
    post: PostView,
    #[serde(default)]
    reason: Option<Value>,
}

#[derive(Deserialize)]
struct PostView {
    uri: String,
    author: PostAuthor,
    record: Value,
    #[serde(default)]
    labels: Vec<Value>,
}

#[derive(Deserialize)]
struct PostAuthor {
    did: String,
}
