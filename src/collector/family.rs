//! Metric Family Model
//!
//! A metric family is a named, typed group of labeled samples built
//! fresh on every collection pass. The family list produced by one
//! pass is the sole output contract of the collector; the scrape
//! endpoint renders it into the Prometheus text exposition format.

// =============================================================================
// Metric Type
// =============================================================================

/// Type of a metric family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    /// Point-in-time value that may increase or decrease
    Gauge,
    /// Monotonically increasing value
    Counter,
}

impl MetricType {
    /// Exposition-format type keyword
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Gauge => "gauge",
            MetricType::Counter => "counter",
        }
    }
}

// =============================================================================
// Sample
// =============================================================================

/// One labeled data point
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Label values, positionally matching the family's label names
    pub label_values: Vec<String>,
    /// Numeric value, integer attributes widened to f64
    pub value: f64,
}

// =============================================================================
// Metric Family
// =============================================================================

/// A named, typed collection of labeled samples
#[derive(Debug, Clone)]
pub struct MetricFamily {
    name: String,
    help: String,
    metric_type: MetricType,
    label_names: Vec<String>,
    samples: Vec<Sample>,
}

impl MetricFamily {
    /// Create an empty gauge family
    pub fn gauge(name: &str, help: &str, label_names: &[&str]) -> Self {
        Self::new(name, help, MetricType::Gauge, label_names)
    }

    /// Create an empty counter family
    pub fn counter(name: &str, help: &str, label_names: &[&str]) -> Self {
        Self::new(name, help, MetricType::Counter, label_names)
    }

    fn new(name: &str, help: &str, metric_type: MetricType, label_names: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            help: help.to_string(),
            metric_type,
            label_names: label_names.iter().map(|n| n.to_string()).collect(),
            samples: Vec::new(),
        }
    }

    /// Append one sample. Label values must already be sanitized and
    /// positionally match the family's label names.
    pub fn add_sample(&mut self, label_values: Vec<String>, value: f64) {
        debug_assert_eq!(label_values.len(), self.label_names.len());
        self.samples.push(Sample {
            label_values,
            value,
        });
    }

    /// Family name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Help string
    pub fn help(&self) -> &str {
        &self.help
    }

    /// Family type
    pub fn metric_type(&self) -> MetricType {
        self.metric_type
    }

    /// Fixed label names
    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }

    /// Samples in resource order
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Render this family into the text exposition format
    pub fn encode(&self, output: &mut String) {
        output.push_str(&format!("# HELP {} {}\n", self.name, self.help));
        output.push_str(&format!(
            "# TYPE {} {}\n",
            self.name,
            self.metric_type.as_str()
        ));

        for sample in &self.samples {
            let labels = self
                .label_names
                .iter()
                .zip(&sample.label_values)
                .map(|(k, v)| format!("{}=\"{}\"", k, v))
                .collect::<Vec<_>>()
                .join(",");

            output.push_str(&format!("{}{{{}}} {}\n", self.name, labels, sample.value));
        }
    }
}

/// Render a whole family list into the text exposition format
pub fn encode_families(families: &[MetricFamily]) -> String {
    let mut output = String::new();
    for family in families {
        family.encode(&mut output);
    }
    output
}

// =============================================================================
// Tests
// =============================================================================
