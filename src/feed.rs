//! APOD feed records and the HTTP client that retrieves them.
//!
//! The feed is a JSON array of loosely shaped objects. Only the media type is
//! checked; every other field is taken as-is, so a record with the right tag
//! but missing fields still becomes a (partly empty) [`DisplayImage`].

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::date_bound::FeedDate;

/// Feed used when none is configured
pub const DEFAULT_FEED_URL: &str = "https://cdn.jsdelivr.net/gh/GCA-Classroom/apod/data.json";

/// `media_type` tag of records that are still images
pub const IMAGE_MEDIA_TYPE: &str = "image";

/// One record of the feed as it arrives on the wire.
///
/// Fields are kept as raw JSON values so a record with an oddly typed field
/// still reaches the media-type check instead of failing to decode.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FeedItem {
    pub media_type: Option<Value>,
    pub title: Option<Value>,
    pub url: Option<Value>,
    pub hdurl: Option<Value>,
    pub date: Option<Value>,
    pub explanation: Option<Value>,
    pub copyright: Option<Value>,
}

impl FeedItem {
    pub fn is_image(&self) -> bool {
        matches!(&self.media_type, Some(Value::String(tag)) if tag == IMAGE_MEDIA_TYPE)
    }
}

/// Text form of a feed value: strings as-is, arrays joined with commas,
/// other scalars and objects as compact JSON
fn value_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Array(items) => items
            .into_iter()
            .map(value_text)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

/// The part of a feed record the gallery shows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayImage {
    pub title: String,
    pub url: String,
    pub date: String,
    pub explanation: String,
    pub hdurl: Option<String>,
    pub copyright: Option<String>,
    /// The feed sent something other than a string as the date. It is shown
    /// in text form but never read as a calendar date.
    pub date_malformed: bool,
}

impl DisplayImage {
    pub fn feed_date(&self) -> FeedDate {
        if self.date_malformed {
            return FeedDate::Unparsed;
        }
        FeedDate::parse(&self.date)
    }
}

impl From<FeedItem> for DisplayImage {
    fn from(item: FeedItem) -> Self {
        let date_malformed = item.date.as_ref().is_some_and(|d| !d.is_string());
        Self {
            title: item.title.map(value_text).unwrap_or_default(),
            url: item.url.map(value_text).unwrap_or_default(),
            date: item.date.map(value_text).unwrap_or_default(),
            explanation: item.explanation.map(value_text).unwrap_or_default(),
            hdurl: item.hdurl.map(value_text),
            copyright: item.copyright.map(|c| value_text(c).trim().to_string()),
            date_malformed,
        }
    }
}

/// Keep image records only, in feed order
pub fn project_images(items: Vec<FeedItem>) -> Vec<DisplayImage> {
    items
        .into_iter()
        .filter(FeedItem::is_image)
        .map(DisplayImage::from)
        .collect()
}

/// Ways a feed fetch can fail
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("network error: {status} {reason}")]
    Status { status: u16, reason: String },

    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),

    #[error("feed is not a JSON array: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Decode a feed body. The body must be a JSON array; elements that are not
/// objects are dropped, every object is kept for the media-type check.
pub fn decode_feed(body: &[u8]) -> Result<Vec<FeedItem>, FeedError> {
    let raw: Vec<Value> = serde_json::from_slice(body)?;
    let total = raw.len();

    let items: Vec<FeedItem> = raw
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| {
            if !value.is_object() {
                tracing::debug!("Dropping feed record {}: not an object", i);
                return None;
            }
            match serde_json::from_value(value) {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::debug!("Dropping feed record {}: {}", i, e);
                    None
                }
            }
        })
        .collect();

    tracing::debug!("Decoded {}/{} feed records", items.len(), total);
    Ok(items)
}

/// HTTP client for the feed and for the images it links to
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    url: String,
}

impl FeedClient {
    pub fn new(url: impl Into<String>, user_agent: &str) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(FeedError::Client)?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// GET the feed and decode it
    pub async fn fetch(&self) -> Result<Vec<FeedItem>, FeedError> {
        let body = self.get_bytes(&self.url).await?;
        decode_feed(&body)
    }

    /// GET any URL and return the body, failing on non-success statuses
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FeedError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(FeedError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = response.bytes().await.map_err(FeedError::Body)?;
        Ok(body.to_vec())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::gallery::{CycleOutcome, DateRange};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve a single canned HTTP response on localhost and return its URL
    pub(crate) async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });

        format!("http://{}/data.json", addr)
    }

    /// A URL nothing listens on
    pub(crate) async fn dead_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}/data.json", addr)
    }

    const SAMPLE: &str = r#"[
        {"media_type": "image", "title": "Horsehead", "url": "https://apod.example/h.jpg",
         "hdurl": "https://apod.example/h_big.jpg", "date": "2020-06-01",
         "explanation": "Dark nebula.", "copyright": "\nSomeone\n"},
        {"media_type": "video", "title": "Launch", "url": "https://youtube.example/x", "date": "2020-06-02"},
        {"media_type": "image", "title": "Moon", "url": "https://apod.example/m.jpg", "date": "2020-06-03",
         "explanation": "Full."}
    ]"#;

    #[test]
    fn test_decode_and_project() {
        let items = decode_feed(SAMPLE.as_bytes()).unwrap();
        assert_eq!(items.len(), 3);

        let images = project_images(items);
        let titles: Vec<_> = images.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["Horsehead", "Moon"]);
        assert_eq!(images[0].copyright.as_deref(), Some("Someone"));
        assert_eq!(images[0].hdurl.as_deref(), Some("https://apod.example/h_big.jpg"));
        assert_eq!(images[1].hdurl, None);
    }

    #[test]
    fn test_decode_keeps_incomplete_image_records() {
        let items = decode_feed(br#"[{"media_type": "image"}]"#).unwrap();
        let images = project_images(items);
        assert_eq!(images.len(), 1);
        assert_eq!(images[0], DisplayImage::default());
    }

    #[test]
    fn test_decode_drops_non_objects() {
        let items = decode_feed(br#"[42, "x", null, {"media_type": "image", "title": "ok"}]"#).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, Some(Value::from("ok")));
    }

    #[test]
    fn test_oddly_typed_fields_still_render() {
        let body = br#"[
            {"media_type": "image", "title": 123, "url": "https://apod.example/a.jpg",
             "date": "2020-06-01", "explanation": "Fine."},
            {"media_type": "image", "title": "ok", "url": "https://apod.example/b.jpg",
             "date": "2020-06-02", "explanation": ["x", "y"], "copyright": null},
            {"media_type": 7, "title": "not an image"}
        ]"#;
        let images = project_images(decode_feed(body).unwrap());
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].title, "123");
        assert_eq!(images[1].explanation, "x,y");
        assert_eq!(images[1].copyright, None);

        let range = DateRange::default();
        match CycleOutcome::from_fetch(decode_feed(body), &range) {
            CycleOutcome::Loaded(images) => assert_eq!(images.len(), 2),
            other => panic!("expected two cards, got {:?}", other),
        }
    }

    #[test]
    fn test_non_string_date_is_unparsed() {
        let body = br#"[{"media_type": "image", "title": "t", "date": ["2020-06-01"]}]"#;
        let images = project_images(decode_feed(body).unwrap());
        assert_eq!(images[0].date, "2020-06-01");
        assert_eq!(images[0].feed_date(), FeedDate::Unparsed);

        let body = br#"[{"media_type": "image", "title": "t", "date": null}]"#;
        let images = project_images(decode_feed(body).unwrap());
        assert_eq!(images[0].feed_date(), FeedDate::Missing);
    }

    #[test]
    fn test_decode_rejects_non_array() {
        assert!(matches!(
            decode_feed(br#"{"media_type": "image"}"#),
            Err(FeedError::Decode(_))
        ));
        assert!(matches!(decode_feed(b"<html>"), Err(FeedError::Decode(_))));
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let url = serve_once("200 OK", SAMPLE).await;
        let client = FeedClient::new(url, "darkwall-apod-test").unwrap();
        let items = client.fetch().await.unwrap();
        assert_eq!(items.len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_bad_status() {
        let url = serve_once("503 Service Unavailable", "[]").await;
        let client = FeedClient::new(url, "darkwall-apod-test").unwrap();
        match client.fetch().await {
            Err(FeedError::Status { status, .. }) => assert_eq!(status, 503),
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let client = FeedClient::new(dead_url().await, "darkwall-apod-test").unwrap();
        assert!(matches!(client.fetch().await, Err(FeedError::Request(_))));
    }
}
