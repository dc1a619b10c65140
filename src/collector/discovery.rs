//! Resource Discoverer
//!
//! Enumerates cache statistics resources in the management namespace.
//! Discovery is all-or-nothing: if the management interface cannot be
//! queried, the whole collection pass fails rather than continuing
//! with a partial resource set.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::error::Result;
use crate::management::{ManagementClient, ResourceIdentity};

/// Object-name pattern matching every cache statistics resource,
/// whatever the cache and container names are.
pub const CACHE_STATISTICS_PATTERN: &str =
    "org.wildfly.clustering.infinispan:component=Statistics,name=*,manager=*,type=Cache";

/// Discovers cache statistics resources
pub struct ResourceDiscoverer {
    client: Arc<dyn ManagementClient>,
}

impl ResourceDiscoverer {
    /// Create a new discoverer over the given management client
    pub fn new(client: Arc<dyn ManagementClient>) -> Self {
        Self { client }
    }

    /// Enumerate all resources matching the cache statistics pattern.
    ///
    /// Zero, one, or many matches are all valid results; duplicates
    /// cannot occur because object names are unique within the
    /// management namespace.
    #[instrument(skip(self))]
    pub async fn discover(&self) -> Result<Vec<ResourceIdentity>> {
        let resources = self.client.query_resources(CACHE_STATISTICS_PATTERN).await?;
        debug!(
            "Discovery matched {} cache statistics resources",
            resources.len()
        );
        Ok(resources)
    }
}
