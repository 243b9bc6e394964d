//! The Metropolitan Museum of Art collection API.
//!
//! `GET {api}/objects/{id}` returns one JSON object per artwork. Unknown ids
//! answer 404; ids that exist but are not displayable may answer 200 with only
//! a `message` field. Empty strings are the API's way of saying "absent".

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::{not_found_as_none, Source};
use crate::error::{ExtractionError, Result};
use crate::fetcher::Fetcher;
use crate::models::ItemRecord;

/// Registry name.
pub const NAME: &str = "met";

/// Collection API root.
const API_BASE_URL: &str = "https://collectionapi.metmuseum.org/public/collection/v1/";

/// JSON fields copied into [`ItemRecord::details`], in this order.
const DETAIL_FIELDS: &[&str] = &["objectDate", "department", "medium", "dimensions"];

pub(super) fn build(fetcher: Fetcher) -> Box<dyn Source> {
    Box::new(MetMuseum::new(fetcher))
}

/// Client for the Met collection API.
#[derive(Debug, Clone)]
pub struct MetMuseum {
    fetcher: Fetcher,
    api: Url,
}

impl MetMuseum {
    pub fn new(fetcher: Fetcher) -> Self {
        // `API_BASE_URL` is a constant absolute URL, parsed in this module's tests.
        let api = API_BASE_URL.parse::<Url>().expect("API URL is valid");
        Self { fetcher, api }
    }

    /// Use another API root (a test server, for instance).
    pub fn with_api_url(fetcher: Fetcher, api: Url) -> Self {
        Self { fetcher, api }
    }
}

#[async_trait]
impl Source for MetMuseum {
    fn name(&self) -> &str {
        NAME
    }

    fn item_url(&self, identifier: &str) -> String {
        format!("{}objects/{}", self.api, identifier)
    }

    async fn extract_item_info(&self, identifier: &str) -> Result<Option<ItemRecord>> {
        let url = self.item_url(identifier);
        let Some(body) = not_found_as_none(self.fetcher.fetch_markup(&url).await)? else {
            debug!("Object {} not found (404)", identifier);
            return Ok(None);
        };

        let json: Value = serde_json::from_str(&body)?;
        parse_object(identifier, &json)
    }
}

/// Convert one object payload.
pub fn parse_object(identifier: &str, json: &Value) -> Result<Option<ItemRecord>> {
    if !json.is_object() {
        return Err(ExtractionError::Malformed {
            identifier: identifier.to_string(),
            reason: "expected a JSON object".to_string(),
        });
    }

    if json.get("objectID").map_or(true, Value::is_null) {
        if let Some(message) = json.get("message").and_then(|m| m.as_str()) {
            debug!("Object {}: {}", identifier, message);
        }
        return Ok(None);
    }

    let mut record = ItemRecord::new(identifier)
        .with_title(get_str(json, "title"))
        .with_artist(get_str(json, "artistDisplayName"))
        .with_image_url(get_str(json, "primaryImage"));

    for field in DETAIL_FIELDS {
        record = record.with_detail(get_str(json, field));
    }

    Ok(Some(record))
}

/// Get string from JSON, returning empty string if not found.
fn get_str(json: &Value, key: &str) -> String {
    json.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}
