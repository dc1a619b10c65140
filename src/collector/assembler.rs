//! Metric Assembler
//!
//! Turns the set of discovered cache statistics resources into the
//! five Infinispan metric families, one sample per resource, with
//! sanitized `(name, manager)` labels.

use std::sync::Arc;

use tracing::{instrument, warn};

use super::family::MetricFamily;
use super::sanitize::sanitize_label;
use crate::error::Result;
use crate::management::{ManagementClient, ResourceIdentity};

/// Label keys shared by every family
const LABEL_NAMES: [&str; 2] = ["name", "manager"];

// =============================================================================
// Cache Statistics
// =============================================================================

/// Point-in-time statistics read off one cache resource.
///
/// The five attributes are read independently, so they may reflect
/// slightly different instants within one pass. Accepted relaxation:
/// the management interface offers no multi-attribute snapshot.
#[derive(Debug, Clone, PartialEq)]
struct CacheStats {
    hit_ratio: f64,
    hits: f64,
    misses: f64,
    entries: f64,
    evictions: f64,
}

// =============================================================================
// Assembly
// =============================================================================

/// Result of one assembly pass
#[derive(Debug, Default)]
pub struct Assembly {
    /// Metric families in fixed order, empty if nothing was discovered
    pub families: Vec<MetricFamily>,
    /// Resources skipped because their attribute reads failed
    pub skipped: usize,
}

// =============================================================================
// Metric Assembler
// =============================================================================

/// Assembles discovered resources into metric families
pub struct MetricAssembler {
    client: Arc<dyn ManagementClient>,
}

impl MetricAssembler {
    /// Create a new assembler over the given management client
    pub fn new(client: Arc<dyn ManagementClient>) -> Self {
        Self { client }
    }

    /// Build the five metric families for the given resources.
    ///
    /// Resources are processed in input order, and every family holds
    /// its samples in that same order, so samples at equal positions
    /// across families describe the same cache. A resource whose
    /// attribute reads fail is skipped from all five families and
    /// counted, and the rest of the pass continues.
    ///
    /// Zero resources produce zero families rather than five empty
    /// ones, so a scraper sees the metric names entirely absent when
    /// there is nothing to report.
    #[instrument(skip(self, resources), fields(resources = resources.len()))]
    pub async fn assemble(&self, resources: &[ResourceIdentity]) -> Assembly {
        if resources.is_empty() {
            return Assembly::default();
        }

        let mut hit_ratio =
            MetricFamily::gauge("infinispan_hit_ratio", "Cache hit ratio", &LABEL_NAMES);
        let mut hits =
            MetricFamily::counter("infinispan_hit_total", "Number of hits", &LABEL_NAMES);
        let mut misses =
            MetricFamily::counter("infinispan_miss_total", "Number of misses", &LABEL_NAMES);
        let mut entries =
            MetricFamily::gauge("infinispan_entries_total", "Number of entries", &LABEL_NAMES);
        let mut evictions = MetricFamily::counter(
            "infinispan_evictions_total",
            "Number of evictions",
            &LABEL_NAMES,
        );

        let mut skipped = 0;
        for resource in resources {
            let stats = match self.read_stats(resource).await {
                Ok(stats) => stats,
                Err(e) => {
                    warn!("Skipping cache {}: {}", resource, e);
                    skipped += 1;
                    continue;
                }
            };

            let labels = vec![
                sanitize_label(resource.name()),
                sanitize_label(resource.manager()),
            ];

            hit_ratio.add_sample(labels.clone(), stats.hit_ratio);
            hits.add_sample(labels.clone(), stats.hits);
            misses.add_sample(labels.clone(), stats.misses);
            entries.add_sample(labels.clone(), stats.entries);
            evictions.add_sample(labels, stats.evictions);
        }

        Assembly {
            families: vec![hit_ratio, hits, misses, entries, evictions],
            skipped,
        }
    }

    /// Read the five statistic attributes off one resource
    async fn read_stats(&self, resource: &ResourceIdentity) -> Result<CacheStats> {
        Ok(CacheStats {
            hit_ratio: self.client.read_attribute(resource, "hitRatio").await?,
            hits: self.client.read_attribute(resource, "hits").await?,
            misses: self.client.read_attribute(resource, "misses").await?,
            entries: self
                .client
                .read_attribute(resource, "numberOfEntries")
                .await?,
            evictions: self.client.read_attribute(resource, "evictions").await?,
        })
    }
}
