//! Host capabilities
//!
//! Plugin hosts identify URIs by small integers (URIDs). The plugin maps the
//! property URIs it understands once, at construction, and compares integers
//! on the rendering path.

use std::collections::HashMap;

/// Mapped URI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Urid(pub u32);

/// URI to URID mapping service provided by the host
pub trait UridMap {
    /// Map a URI, returning the same URID for the same URI every time
    fn map(&mut self, uri: &str) -> Urid;
}

/// In-process URID map for offline hosts and tests
///
/// URIDs start at 1 and are handed out in mapping order.
#[derive(Debug, Default, Clone)]
pub struct SimpleUridMap {
    ids: HashMap<String, Urid>,
    uris: Vec<String>,
}

impl SimpleUridMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// URI previously mapped to a URID
    pub fn unmap(&self, urid: Urid) -> Option<&str> {
        let index = (urid.0 as usize).checked_sub(1)?;
        self.uris.get(index).map(String::as_str)
    }

    /// URID for a URI, if it has been mapped
    pub fn get(&self, uri: &str) -> Option<Urid> {
        self.ids.get(uri).copied()
    }
}

impl UridMap for SimpleUridMap {
    fn map(&mut self, uri: &str) -> Urid {
        if let Some(urid) = self.ids.get(uri) {
            return *urid;
        }
        self.uris.push(uri.to_owned());
        let urid = Urid(self.uris.len() as u32);
        self.ids.insert(uri.to_owned(), urid);
        urid
    }
}

/// Features offered by the host at instantiation
#[derive(Default)]
pub struct HostFeatures<'a> {
    /// URID mapping (required)
    pub urid_map: Option<&'a mut dyn UridMap>,
}

impl<'a> HostFeatures<'a> {
    /// Features with a URID map
    pub fn with_urid_map(map: &'a mut dyn UridMap) -> Self {
        Self { urid_map: Some(map) }
    }
}

impl std::fmt::Debug for HostFeatures<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostFeatures")
            .field("urid_map", &self.urid_map.is_some())
            .finish()
    }
}
