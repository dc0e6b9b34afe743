//! Project resource collection.
//!
//! A [`Project`] keeps the resources of a session, generates ids for them
//! and round-trips the whole collection as one JSON document whose
//! top-level keys are the resource ids.

use rustc_hash::{FxHashMap, FxHashSet};
use uuid::Uuid;

use crate::errors::Result;
use crate::serialization::resource::Resource;
use crate::serialization::serializer::{self, Serialization};

/// External collaborator that fetches the text of a resource file for
/// [`Project::load_resources`]. Network transports, archives etc. live
/// behind this seam.
pub trait ResourceLoader {
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Filesystem-backed loader: the url is a plain path.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLoader;

impl ResourceLoader for FsLoader {
    fn fetch(&self, url: &str) -> Result<String> {
        Ok(std::fs::read_to_string(url)?)
    }
}

/// Registry of the resources used within one session.
///
/// Resources are objects referenced many times but stored once; the
/// project assigns each a session-unique id on registration.
#[derive(Default)]
pub struct Project {
    resources: FxHashMap<String, Box<dyn Resource>>,
    /// Urls already merged, so repeated loads coalesce into a no-op.
    loaded_urls: FxHashSet<String>,
}

impl Project {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a resource, generating an id unless the resource already
    /// carries an unclaimed one. Returns the id it is stored under.
    pub fn register(&mut self, mut resource: Box<dyn Resource>) -> String {
        let id = match resource.id() {
            Some(id) if !self.resources.contains_key(id) => id.to_string(),
            _ => self.generate_id(resource.type_name()),
        };
        resource.set_id(Some(id.clone()));
        self.resources.insert(id.clone(), resource);
        id
    }

    /// Removes a resource from the collection.
    pub fn deregister(&mut self, id: &str) -> Option<Box<dyn Resource>> {
        let mut resource = self.resources.remove(id)?;
        resource.set_id(None);
        Some(resource)
    }

    /// Drops all resources and the load-coalescing record.
    pub fn clear(&mut self) {
        self.resources.clear();
        self.loaded_urls.clear();
    }

    /// Resolves a resource id.
    ///
    /// A missing id is logged and reported as `None` rather than raised:
    /// one broken reference must not crash a whole loaded scene. Callers
    /// null-check.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&dyn Resource> {
        match self.resources.get(id) {
            Some(resource) => Some(resource.as_ref()),
            None => {
                log::error!("Resource not found: {id}");
                None
            }
        }
    }

    /// Resolves and downcasts a resource id.
    #[must_use]
    pub fn get_as<T: Resource + 'static>(&self, id: &str) -> Option<&T> {
        self.get(id)?.as_any().downcast_ref::<T>()
    }

    /// All resources carrying the requested name.
    #[must_use]
    pub fn resources_by_name(&self, name: &str) -> Vec<&dyn Resource> {
        self.resources
            .values()
            .filter(|r| r.name() == name)
            .map(|r| &**r)
            .collect()
    }

    /// All resources of the concrete type `T`.
    #[must_use]
    pub fn resources_by_type<T: Resource + 'static>(&self) -> Vec<&T> {
        self.resources
            .values()
            .filter_map(|r| r.as_any().downcast_ref::<T>())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    /// Builds a readable session-unique id. Uniqueness is still verified
    /// against the live collection; on the (astronomically unlikely)
    /// collision the id is regenerated.
    fn generate_id(&self, type_name: &str) -> String {
        loop {
            let id = format!("{type_name}|{}", Uuid::new_v4());
            if !self.resources.contains_key(&id) {
                return id;
            }
        }
    }

    // ========================================================================
    // Collection round trip
    // ========================================================================

    /// Serializes every registered resource into one document keyed by
    /// resource id.
    #[must_use]
    pub fn serialize_resources(&self) -> Serialization {
        let mut document = Serialization::new();
        for (id, resource) in &self.resources {
            document.insert(
                id.clone(),
                serde_json::Value::Object(serializer::serialize_resource(resource.as_ref())),
            );
        }
        document
    }

    /// Merges a resource document into the collection. Returns how many
    /// resources were reconstructed.
    ///
    /// Tolerant per entry: an unknown type tag or a broken payload is
    /// logged and skipped, so one corrupt resource does not abort the rest
    /// of the load.
    pub fn deserialize_resources(&mut self, document: &Serialization) -> usize {
        let mut count = 0;
        for (id, entry) in document {
            let Some(tagged) = entry.as_object() else {
                log::error!("resource entry {id} is not an object; skipped");
                continue;
            };
            match serializer::deserialize_resource(tagged) {
                Ok(mut resource) => {
                    resource.set_id(Some(id.clone()));
                    self.resources.insert(id.clone(), resource);
                    count += 1;
                }
                Err(error) => {
                    log::error!("failed to deserialize resource {id}: {error}");
                }
            }
        }
        count
    }

    /// Fetches a resource file through the injected loader and merges it.
    ///
    /// A malformed document aborts with nothing committed. Loading a url
    /// that was already merged is coalesced into a no-op, so re-entrant
    /// loads of the same file share the already-present result.
    pub fn load_resources(&mut self, loader: &dyn ResourceLoader, url: &str) -> Result<usize> {
        if self.loaded_urls.contains(url) {
            log::debug!("load of {url} coalesced; already merged");
            return Ok(0);
        }
        let text = loader.fetch(url)?;
        let document = serializer::parse(&text)?;
        self.loaded_urls.insert(url.to_string());
        Ok(self.deserialize_resources(&document))
    }
}
