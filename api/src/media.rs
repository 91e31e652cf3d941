use async_trait::async_trait;
use axum::body::Bytes;
use base64::{Engine, engine::general_purpose::STANDARD};
use dashmap::DashMap;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Invalid image payload: {0}")]
    InvalidPayload(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Clone)]
pub struct StoredMedia {
    pub content_type: String,
    pub data: Bytes,
}

/// Image storage collaborator. Uploads hand back a durable URL whose last path
/// segment, minus extension, is the id accepted by `destroy`.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(&self, source: &str) -> Result<String, MediaError>;

    /// Returns whether something was actually removed.
    async fn destroy(&self, public_id: &str) -> Result<bool, MediaError>;

    async fn fetch(&self, public_id: &str) -> Result<Option<StoredMedia>, MediaError>;
}

/// Derives the storage id from a media URL: last path segment up to the first dot.
///
/// `https://cdn/x/abc123.png` -> `abc123`. No check is made that the id exists.
pub fn public_id_from_url(url: &str) -> Option<&str> {
    url.rsplit('/')
        .next()
        .and_then(|segment| segment.split('.').next())
        .filter(|id| !id.is_empty())
}

/// Removes a stored image by URL. Failures are logged and otherwise ignored.
pub async fn destroy_best_effort(store: &dyn MediaStore, url: &str) {
    let Some(public_id) = public_id_from_url(url) else {
        warn!("Could not derive media id from {}", url);
        return;
    };

    match store.destroy(public_id).await {
        Ok(true) => info!("Media removed: {}", public_id),
        Ok(false) => warn!("Media {} was already gone", public_id),
        Err(e) => warn!("Failed to remove media {}: {}", public_id, e),
    }
}

/// Keeps uploaded images in process memory, keyed by public id.
pub struct InMemoryMediaStore {
    base_url: String,
    objects: DashMap<String, StoredMedia>,
}

impl InMemoryMediaStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl MediaStore for InMemoryMediaStore {
    async fn upload(&self, source: &str) -> Result<String, MediaError> {
        let (content_type, data) = parse_data_url(source)?;
        let extension = extension_for(&content_type).to_string();
        let public_id = Uuid::new_v4().simple().to_string();

        self.objects.insert(
            public_id.clone(),
            StoredMedia {
                content_type,
                data: Bytes::from(data),
            },
        );

        Ok(format!("{}/{}.{}", self.base_url, public_id, extension))
    }

    async fn destroy(&self, public_id: &str) -> Result<bool, MediaError> {
        Ok(self.objects.remove(public_id).is_some())
    }

    async fn fetch(&self, public_id: &str) -> Result<Option<StoredMedia>, MediaError> {
        Ok(self.objects.get(public_id).map(|entry| entry.value().clone()))
    }
}

/// Accepts `data:<mime>;base64,<payload>` image sources.
fn parse_data_url(source: &str) -> Result<(String, Vec<u8>), MediaError> {
    let rest = source
        .strip_prefix("data:")
        .ok_or_else(|| MediaError::InvalidPayload("expected a base64 data URL".into()))?;

    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| MediaError::InvalidPayload("missing data separator".into()))?;

    let content_type = meta
        .strip_suffix(";base64")
        .ok_or_else(|| MediaError::InvalidPayload("only base64 encoding is supported".into()))?;

    if !content_type.starts_with("image/") {
        return Err(MediaError::InvalidPayload(format!(
            "unsupported content type {}",
            content_type
        )));
    }

    let data = STANDARD
        .decode(payload.trim())
        .map_err(|e| MediaError::InvalidPayload(e.to_string()))?;

    Ok((content_type.to_string(), data))
}

fn extension_for(content_type: &str) -> &str {
    match content_type {
        "image/jpeg" => "jpg",
        "image/svg+xml" => "svg",
        other => other.strip_prefix("image/").unwrap_or("bin"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &str = "data:image/png;base64,iVBORw0KGgo=";

    #[test]
    fn public_id_is_last_segment_without_extension() {
        assert_eq!(
            public_id_from_url("https://res.example.com/demo/upload/v1/abc123.png"),
            Some("abc123")
        );
        assert_eq!(public_id_from_url("abc.tar.gz"), Some("abc"));
        assert_eq!(public_id_from_url("https://host/path/"), None);
    }

    #[tokio::test]
    async fn upload_returns_url_that_resolves_back() {
        let store = InMemoryMediaStore::new("http://localhost:3000/media");

        let url = store.upload(PNG).await.unwrap();
        assert!(url.starts_with("http://localhost:3000/media/"));
        assert!(url.ends_with(".png"));

        let id = public_id_from_url(&url).unwrap();
        let stored = store.fetch(id).await.unwrap().unwrap();
        assert_eq!(stored.content_type, "image/png");
        assert_eq!(&stored.data[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[tokio::test]
    async fn destroy_reports_whether_anything_was_removed() {
        let store = InMemoryMediaStore::new("http://media");
        let url = store.upload(PNG).await.unwrap();
        let id = public_id_from_url(&url).unwrap().to_string();

        assert!(store.destroy(&id).await.unwrap());
        assert!(!store.destroy(&id).await.unwrap());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn rejects_non_image_and_non_data_sources() {
        let store = InMemoryMediaStore::new("http://media");

        assert!(matches!(
            store.upload("https://elsewhere.com/cat.png").await,
            Err(MediaError::InvalidPayload(_))
        ));
        assert!(matches!(
            store.upload("data:text/plain;base64,aGk=").await,
            Err(MediaError::InvalidPayload(_))
        ));
        assert!(matches!(
            store.upload("data:image/png;base64,***").await,
            Err(MediaError::InvalidPayload(_))
        ));
    }
}
