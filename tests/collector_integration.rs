//! Infinispan Exporter Integration Tests
//!
//! Exercises the public collection-pass surface end to end against an
//! in-memory management interface:
//! - Discovery and family assembly
//! - Per-resource failure isolation
//! - Label sanitization and text exposition

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use infinispan_exporter::collector::{encode_families, CacheStatsCollector, MetricType};
use infinispan_exporter::error::{Error, Result};
use infinispan_exporter::management::{ManagementClient, ResourceIdentity};

// =============================================================================
// In-Memory Management Interface
// =============================================================================

#[derive(Default)]
struct InMemoryManagement {
    resources: Vec<ResourceIdentity>,
    attributes: HashMap<(String, String), f64>,
    discovery_down: bool,
}

impl InMemoryManagement {
    fn with_cache(mut self, name: &str, manager: &str, stats: [f64; 5]) -> Self {
        let object_name = format!(
            "org.wildfly.clustering.infinispan:component=Statistics,name=\"{}\",manager=\"{}\",type=Cache",
            name, manager
        );
        let identity = ResourceIdentity::parse(&object_name).unwrap();

        for (attribute, value) in ["hitRatio", "hits", "misses", "numberOfEntries", "evictions"]
            .iter()
            .zip(stats)
        {
            self.attributes
                .insert((object_name.clone(), attribute.to_string()), value);
        }
        self.resources.push(identity);
        self
    }

    /// Register a resource whose attribute reads all fail, as if the
    /// cache vanished between discovery and assembly.
    fn with_vanished_cache(mut self, name: &str, manager: &str) -> Self {
        let object_name = format!(
            "org.wildfly.clustering.infinispan:component=Statistics,name=\"{}\",manager=\"{}\",type=Cache",
            name, manager
        );
        self.resources
            .push(ResourceIdentity::parse(&object_name).unwrap());
        self
    }
}

#[async_trait]
impl ManagementClient for InMemoryManagement {
    async fn query_resources(&self, pattern: &str) -> Result<Vec<ResourceIdentity>> {
        if self.discovery_down {
            return Err(Error::Discovery(format!(
                "management interface unreachable for '{}'",
                pattern
            )));
        }
        Ok(self.resources.clone())
    }

    async fn read_attribute(&self, resource: &ResourceIdentity, attribute: &str) -> Result<f64> {
        self.attributes
            .get(&(resource.object_name().to_string(), attribute.to_string()))
            .copied()
            .ok_or_else(|| Error::AttributeRead {
                resource: resource.object_name().to_string(),
                attribute: attribute.to_string(),
                reason: "resource vanished".to_string(),
            })
    }
}

fn collector(management: InMemoryManagement) -> CacheStatsCollector {
    CacheStatsCollector::new(Arc::new(management))
}

// =============================================================================
// Collection Pass Tests
// =============================================================================

mod collection_tests {
    use super::*;

    #[tokio::test]
    async fn test_reference_scenario() {
        let management = InMemoryManagement::default().with_cache(
            "myCache",
            "myContainer",
            [0.93, 930.0, 70.0, 1021.0, 0.0],
        );

        let assembly = collector(management).collect().await;

        assert_eq!(assembly.families.len(), 5);
        let expected = [
            ("infinispan_hit_ratio", MetricType::Gauge, 0.93),
            ("infinispan_hit_total", MetricType::Counter, 930.0),
            ("infinispan_miss_total", MetricType::Counter, 70.0),
            ("infinispan_entries_total", MetricType::Gauge, 1021.0),
            ("infinispan_evictions_total", MetricType::Counter, 0.0),
        ];

        for (family, (name, metric_type, value)) in assembly.families.iter().zip(expected) {
            assert_eq!(family.name(), name);
            assert_eq!(family.metric_type(), metric_type);
            assert_eq!(family.label_names(), ["name", "manager"]);
            assert_eq!(family.samples().len(), 1);

            let sample = &family.samples()[0];
            assert_eq!(sample.label_values, vec!["myCache", "myContainer"]);
            assert_eq!(sample.value, value);
        }
    }

    #[tokio::test]
    async fn test_variable_cardinality() {
        let mut management = InMemoryManagement::default();
        for i in 0..7 {
            management = management.with_cache(
                &format!("cache{}", i),
                "container",
                [0.5, 1.0, 1.0, 1.0, 0.0],
            );
        }

        let assembly = collector(management).collect().await;

        for family in &assembly.families {
            assert_eq!(family.samples().len(), 7);
        }
    }

    #[tokio::test]
    async fn test_empty_discovery_suppresses_families() {
        let assembly = collector(InMemoryManagement::default()).collect().await;
        assert!(assembly.families.is_empty());

        // A scraper sees the metric names entirely absent
        let output = encode_families(&assembly.families);
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn test_discovery_failure_never_raises() {
        let management = InMemoryManagement {
            discovery_down: true,
            ..Default::default()
        };

        let assembly = collector(management).collect().await;
        assert!(assembly.families.is_empty());
        assert_eq!(assembly.skipped, 0);
    }

    #[tokio::test]
    async fn test_vanished_resource_skips_only_itself() {
        let management = InMemoryManagement::default()
            .with_cache("stable", "container", [0.8, 80.0, 20.0, 50.0, 3.0])
            .with_vanished_cache("ghost", "container");

        let assembly = collector(management).collect().await;

        assert_eq!(assembly.families.len(), 5);
        assert_eq!(assembly.skipped, 1);
        for family in &assembly.families {
            assert_eq!(family.samples().len(), 1);
            assert_eq!(family.samples()[0].label_values[0], "stable");
        }
    }
}

// =============================================================================
// Exposition Tests
// =============================================================================

mod exposition_tests {
    use super::*;

    #[tokio::test]
    async fn test_text_exposition_round_trip() {
        let management = InMemoryManagement::default().with_cache(
            "myCache",
            "myContainer",
            [0.93, 930.0, 70.0, 1021.0, 0.0],
        );

        let assembly = collector(management).collect().await;
        let output = encode_families(&assembly.families);

        assert!(output.contains("# TYPE infinispan_hit_ratio gauge"));
        assert!(output.contains("# TYPE infinispan_hit_total counter"));
        assert!(output
            .contains("infinispan_hit_ratio{name=\"myCache\",manager=\"myContainer\"} 0.93"));
        assert!(output
            .contains("infinispan_hit_total{name=\"myCache\",manager=\"myContainer\"} 930"));
    }

    #[tokio::test]
    async fn test_reserved_characters_are_escaped_in_output() {
        let management = InMemoryManagement::default()
            .with_cache("back\\slashCache", "container", [0.5, 5.0, 5.0, 5.0, 0.0])
            .with_cache("plainCache", "container", [0.5, 5.0, 5.0, 5.0, 0.0]);

        let assembly = collector(management).collect().await;

        let samples = assembly.families[0].samples();
        assert_eq!(samples[0].label_values[0], "back\\\\slashCache");
        // The neighboring resource's labels are untouched
        assert_eq!(samples[1].label_values[0], "plainCache");
    }
}
