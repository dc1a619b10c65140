//! Infinispan Cache Statistics Exporter
//!
//! Scrapes cache-subsystem statistics off a running application
//! server's management interface and exposes them as Prometheus
//! metric families, one labeled sample per cache instance, without
//! instrumenting application code.
//!
//! # Architecture
//!
//! ```text
//! Resource Discoverer → Metric Assembler → Metrics Snapshot
//!    (pattern query)     (5 attr reads       (5 families,
//!                         per resource)       text exposition)
//! ```
//!
//! Every collection pass is evaluated fresh at scrape time: the
//! discoverer enumerates all cache statistics MBeans matching a fixed
//! wildcard pattern, and the assembler reads hit ratio, hits, misses,
//! entry count, and evictions off each, labeling every sample with
//! the sanitized cache `name` and `manager`.
//!
//! # Modules
//!
//! - [`collector`] - Discovery-and-transform pipeline
//! - [`error`] - Error types
//! - [`management`] - Management interface client (Jolokia over HTTP)

pub mod collector;
pub mod error;
pub mod management;

// Re-export commonly used types
pub use collector::{Assembly, CacheStatsCollector, MetricFamily, MetricType};
pub use error::{Error, Result};
pub use management::{JolokiaClient, JolokiaConfig, ManagementClient, ResourceIdentity};
