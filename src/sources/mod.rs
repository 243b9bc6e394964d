//! Museum sources.
//!
//! Every source implements [`Source`]: it knows how to build the URL of one
//! item and how to turn that item's markup or JSON into an [`ItemRecord`].
//! Sources are looked up by name through the [`SourceRegistry`].
//!
//! - [`BellasArtes`]: Museo Nacional de Bellas Artes (HTML pages)
//! - [`MetMuseum`]: The Metropolitan Museum of Art (JSON collection API)

pub mod bellasartes;
pub mod met;

use async_trait::async_trait;
use url::Url;

use crate::error::{ExtractionError, FetchError, Result, SetupError};
use crate::fetcher::Fetcher;
use crate::models::ItemRecord;

pub use bellasartes::BellasArtes;
pub use met::MetMuseum;

/// A museum collection that can be scraped item by item.
#[async_trait]
pub trait Source: Send + Sync {
    /// Registry name.
    fn name(&self) -> &str;

    /// Canonical URL of the item page or resource. No network access.
    fn item_url(&self, identifier: &str) -> String;

    /// Fetch and parse one item.
    ///
    /// `Ok(None)` means the identifier has no item at this source; errors are
    /// reserved for unexpected conditions (server errors, unreachable host,
    /// malformed payloads).
    async fn extract_item_info(&self, identifier: &str) -> Result<Option<ItemRecord>>;
}

/// Turn a fetch result into the found / not-found / error tri-state.
///
/// A 404 becomes `Ok(None)`; every other failure is an extraction error.
pub(crate) fn not_found_as_none(
    result: std::result::Result<String, FetchError>,
) -> Result<Option<String>> {
    match result {
        Ok(body) => Ok(Some(body)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(ExtractionError::Fetch(e)),
    }
}

/// Resolve a possibly relative URL found in a page against `base`.
pub(crate) fn resolve_url(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    base.join(href).ok().map(String::from)
}

/// Constructor stored in the registry.
pub type SourceBuilder = fn(Fetcher) -> Box<dyn Source>;

/// A registered source.
#[derive(Clone, Copy)]
pub struct SourceEntry {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub description: &'static str,
    pub build: SourceBuilder,
}

impl SourceEntry {
    /// Whether `name` refers to this entry, ignoring case.
    pub fn matches(&self, name: &str) -> bool {
        let name = name.trim();
        self.name.eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Debug for SourceEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceEntry")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .finish()
    }
}

/// Name-to-constructor mapping for all known sources.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    entries: Vec<SourceEntry>,
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SourceRegistry {
    /// Registry with every source shipped in this crate.
    pub fn builtin() -> Self {
        Self {
            entries: vec![
                SourceEntry {
                    name: bellasartes::NAME,
                    aliases: &["bellas-artes", "museo-bellas-artes", "mnba"],
                    description: "Museo Nacional de Bellas Artes de Argentina (https://www.bellasartes.gob.ar/)",
                    build: bellasartes::build,
                },
                SourceEntry {
                    name: met::NAME,
                    aliases: &["metmuseum"],
                    description: "The Metropolitan Museum of Art (https://collectionapi.metmuseum.org/)",
                    build: met::build,
                },
            ],
        }
    }

    /// Empty registry, for callers registering their own sources.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a source. Lookups return the first match, so an earlier entry wins.
    pub fn register(&mut self, entry: SourceEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[SourceEntry] {
        &self.entries
    }

    /// Find an entry by name or alias, ignoring case.
    pub fn lookup(&self, name: &str) -> Option<&SourceEntry> {
        self.entries.iter().find(|e| e.matches(name))
    }

    /// Build the source registered under `name`.
    pub fn build(
        &self,
        name: &str,
        fetcher: Fetcher,
    ) -> std::result::Result<Box<dyn Source>, SetupError> {
        match self.lookup(name) {
            Some(entry) => Ok((entry.build)(fetcher)),
            None => Err(SetupError::UnknownSource {
                name: name.to_string(),
                available: self.names().join(", "),
            }),
        }
    }

    /// Primary names, in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FetcherConfig;

    fn fetcher() -> Fetcher {
        Fetcher::new(&FetcherConfig::default()).unwrap()
    }

    #[test]
    fn test_lookup_by_alias() {
        let registry = SourceRegistry::builtin();
        assert_eq!(registry.lookup("bellasartes").unwrap().name, "bellasartes");
        assert_eq!(registry.lookup("MNBA").unwrap().name, "bellasartes");
        assert_eq!(registry.lookup(" Bellas-Artes ").unwrap().name, "bellasartes");
        assert_eq!(registry.lookup("metmuseum").unwrap().name, "met");
        assert!(registry.lookup("louvre").is_none());
    }

    #[test]
    fn test_build_known_and_unknown() {
        let registry = SourceRegistry::builtin();

        let source = registry.build("mnba", fetcher()).unwrap();
        assert_eq!(source.name(), "bellasartes");

        match registry.build("louvre", fetcher()) {
            Err(SetupError::UnknownSource { name, available }) => {
                assert_eq!(name, "louvre");
                assert_eq!(available, "bellasartes, met");
            }
            other => panic!("unexpected: {:?}", other.map(|s| s.name().to_string())),
        }
    }

    fn local_mirror(fetcher: Fetcher) -> Box<dyn Source> {
        let site = Url::parse("http://localhost/").unwrap();
        Box::new(BellasArtes::with_base_url(fetcher, site))
    }

    #[test]
    fn test_register_custom_source() {
        let mut registry = SourceRegistry::empty();
        assert!(registry.lookup("bellasartes").is_none());

        registry.register(SourceEntry {
            name: "local",
            aliases: &[],
            description: "Local mirror",
            build: local_mirror,
        });
        assert_eq!(registry.names(), vec!["local"]);
        let source = registry.build("LOCAL", fetcher()).unwrap();
        assert_eq!(source.name(), "bellasartes");
        assert_eq!(source.item_url("7"), "http://localhost/coleccion/obra/7/");
    }

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("https://www.bellasartes.gob.ar/").unwrap();
        assert_eq!(
            resolve_url(&base, "/media/uploads/obra.jpg").as_deref(),
            Some("https://www.bellasartes.gob.ar/media/uploads/obra.jpg")
        );
        assert_eq!(
            resolve_url(&base, "https://cdn.example.org/a.jpg").as_deref(),
            Some("https://cdn.example.org/a.jpg")
        );
        assert_eq!(resolve_url(&base, "  "), None);
    }

    #[test]
    fn test_not_found_as_none() {
        let not_found = FetchError::Status {
            url: "u".to_string(),
            status: 404,
        };
        assert!(matches!(not_found_as_none(Err(not_found)), Ok(None)));

        let server_error = FetchError::Status {
            url: "u".to_string(),
            status: 502,
        };
        assert!(not_found_as_none(Err(server_error)).is_err());
        assert_eq!(
            not_found_as_none(Ok("body".to_string())).unwrap().as_deref(),
            Some("body")
        );
    }
}
