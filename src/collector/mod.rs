//! Cache Statistics Collector
//!
//! The discovery-and-transform pipeline: enumerate cache statistics
//! resources off the management interface, read their statistic
//! attributes, and assemble labeled metric families for scraping.
//!
//! Every collection pass is stateless and independent: discovery and
//! assembly run fresh per scrape, share no mutable state, and leave
//! nothing behind, so concurrent passes are safe as long as the
//! management interface tolerates concurrent read-only queries.

mod assembler;
mod discovery;
mod family;
mod sanitize;

pub use assembler::{Assembly, MetricAssembler};
pub use discovery::{ResourceDiscoverer, CACHE_STATISTICS_PATTERN};
pub use family::{encode_families, MetricFamily, MetricType, Sample};
pub use sanitize::sanitize_label;

use std::sync::Arc;

use tracing::{error, instrument, warn};

use crate::management::ManagementClient;

/// Runs the full collection pass: discovery, then assembly
pub struct CacheStatsCollector {
    discoverer: ResourceDiscoverer,
    assembler: MetricAssembler,
}

impl CacheStatsCollector {
    /// Create a collector over the given management client
    pub fn new(client: Arc<dyn ManagementClient>) -> Self {
        Self {
            discoverer: ResourceDiscoverer::new(client.clone()),
            assembler: MetricAssembler::new(client),
        }
    }

    /// Run one collection pass.
    ///
    /// A failed pass never propagates to the caller: a discovery
    /// error is logged and degrades to an empty snapshot, so the
    /// serving process keeps answering scrapes with "nothing to
    /// report" instead of crashing.
    #[instrument(skip(self))]
    pub async fn collect(&self) -> Assembly {
        let resources = match self.discoverer.discover().await {
            Ok(resources) => resources,
            Err(e) => {
                error!("Cache statistics discovery failed: {}", e);
                return Assembly::default();
            }
        };

        let assembly = self.assembler.assemble(&resources).await;
        if assembly.skipped > 0 {
            warn!(
                "Skipped {} of {} cache resources during collection",
                assembly.skipped,
                resources.len()
            );
        }
        assembly
    }
}

// =============================================================================
// Tests
// =============================================================================
