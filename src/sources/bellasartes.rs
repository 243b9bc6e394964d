//! Museo Nacional de Bellas Artes (Buenos Aires).
//!
//! Item pages live at `https://www.bellasartes.gob.ar/coleccion/obra/{id}/`.
//! The title is the page's `h1`, the artist is the first entry of the
//! `dl.row.mt-3` detail list and the full-size image is linked from the
//! gallery anchor (`a[data-fancybox="gallery"]`).

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use super::{not_found_as_none, resolve_url, Source};
use crate::error::Result;
use crate::fetcher::Fetcher;
use crate::models::ItemRecord;

/// Registry name.
pub const NAME: &str = "bellasartes";

/// Site root; image links on item pages are relative to it.
const SITE_URL: &str = "https://www.bellasartes.gob.ar/";

/// Item page path under the site root.
const ITEM_PATH: &str = "coleccion/obra/";

pub(super) fn build(fetcher: Fetcher) -> Box<dyn Source> {
    Box::new(BellasArtes::new(fetcher))
}

/// Scraper for the Bellas Artes online collection.
#[derive(Debug, Clone)]
pub struct BellasArtes {
    fetcher: Fetcher,
    site: Url,
}

impl BellasArtes {
    pub fn new(fetcher: Fetcher) -> Self {
        // `SITE_URL` is a constant absolute URL, parsed in this module's tests.
        let site = SITE_URL.parse::<Url>().expect("site URL is valid");
        Self { fetcher, site }
    }

    /// Point the scraper at another site root (a mirror or a test server).
    pub fn with_base_url(fetcher: Fetcher, site: Url) -> Self {
        Self { fetcher, site }
    }
}

#[async_trait]
impl Source for BellasArtes {
    fn name(&self) -> &str {
        NAME
    }

    fn item_url(&self, identifier: &str) -> String {
        format!("{}{}{}/", self.site, ITEM_PATH, identifier)
    }

    async fn extract_item_info(&self, identifier: &str) -> Result<Option<ItemRecord>> {
        let url = self.item_url(identifier);
        let Some(html) = not_found_as_none(self.fetcher.fetch_markup(&url).await)? else {
            debug!("Obra {} not found (404)", identifier);
            return Ok(None);
        };

        let record = parse_item_page(identifier, &html, &self.site);
        if record.is_none() {
            debug!("Obra {} has no content block", identifier);
        }
        Ok(record)
    }
}

/// Parse an item page.
///
/// Returns `None` when the page has neither a title nor a gallery image,
/// which is how the site renders identifiers without an artwork.
pub fn parse_item_page(identifier: &str, html: &str, site: &Url) -> Option<ItemRecord> {
    let document = Html::parse_document(html);

    let title = Selector::parse("h1")
        .ok()
        .and_then(|sel| document.select(&sel).next())
        .map(element_text);

    let image_url = Selector::parse(r#"a[data-fancybox="gallery"]"#)
        .ok()
        .and_then(|sel| document.select(&sel).next())
        .and_then(|el| el.value().attr("href"))
        .and_then(|href| resolve_url(site, href));

    let title = title.filter(|t| !t.is_empty());
    if title.is_none() && image_url.is_none() {
        return None;
    }

    let mut details = Selector::parse("dl.row.mt-3 li")
        .ok()
        .map(|sel| document.select(&sel).map(element_text).collect::<Vec<_>>())
        .unwrap_or_default()
        .into_iter();

    let mut record = ItemRecord::new(identifier);
    if let Some(title) = title {
        record = record.with_title(title);
    }
    if let Some(artist) = details.next() {
        record = record.with_artist(artist.replace(',', ""));
    }
    if let Some(image_url) = image_url {
        record = record.with_image_url(image_url);
    }
    for detail in details {
        record = record.with_detail(detail);
    }

    Some(record)
}

/// Text content with whitespace runs collapsed.
fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
