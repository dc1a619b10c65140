//! Management Interface Client
//!
//! Abstractions over the application server's management interface:
//! a JMX namespace exposed over HTTP through a Jolokia-style agent.
//! The collector consumes this as a capability with two operations:
//! enumerate resources matching an object-name pattern, and read a
//! named numeric attribute off one resource.

mod jolokia;

pub use jolokia::{JolokiaClient, JolokiaConfig};

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;

use crate::error::{Error, Result};

// =============================================================================
// Resource Identity
// =============================================================================

/// Identity of one discoverable management resource.
///
/// Carries the canonical object name used for attribute reads plus
/// the `name` (cache) and `manager` (cache container) key properties
/// used for labeling. Identities are supplied fresh by the management
/// interface on every discovery call and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceIdentity {
    object_name: String,
    name: String,
    manager: String,
}

impl ResourceIdentity {
    /// Parse a canonical object name of the form `domain:key=value,key=value,...`.
    ///
    /// Fails if the `name` or `manager` key property is missing. Key
    /// property values may be quoted; quoted values keep embedded
    /// commas intact.
    pub fn parse(object_name: &str) -> Result<Self> {
        let (_domain, props) = object_name.split_once(':').ok_or_else(|| {
            Error::ObjectName(format!("missing ':' separator in '{}'", object_name))
        })?;

        let mut keys = HashMap::new();
        for pair in split_key_properties(props) {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                Error::ObjectName(format!("key property without '=' in '{}'", object_name))
            })?;
            keys.insert(key.trim().to_string(), value.trim_matches('"').to_string());
        }

        let name = keys.remove("name").ok_or_else(|| {
            Error::ObjectName(format!("missing 'name' key property in '{}'", object_name))
        })?;
        let manager = keys.remove("manager").ok_or_else(|| {
            Error::ObjectName(format!("missing 'manager' key property in '{}'", object_name))
        })?;

        Ok(Self {
            object_name: object_name.to_string(),
            name,
            manager,
        })
    }

    /// Canonical object name, as returned by the management interface.
    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    /// Cache identifier (raw, unsanitized).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cache container identifier (raw, unsanitized).
    pub fn manager(&self) -> &str {
        &self.manager
    }
}

impl fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.object_name)
    }
}

/// Split a key-property list on commas, honoring double quotes.
fn split_key_properties(props: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;

    for (i, c) in props.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                parts.push(&props[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&props[start..]);
    parts
}

// =============================================================================
// Management Client Port
// =============================================================================

/// Capability port onto the management interface.
///
/// Both operations are read-only round-trips; implementations must
/// tolerate concurrent callers.
#[async_trait]
pub trait ManagementClient: Send + Sync {
    /// Enumerate all resources whose object name matches `pattern`.
    async fn query_resources(&self, pattern: &str) -> Result<Vec<ResourceIdentity>>;

    /// Read a named numeric attribute off one resource.
    ///
    /// Fails with an attribute-read error if the resource vanished or
    /// the attribute is unknown. Integer attributes are widened to f64.
    async fn read_attribute(&self, resource: &ResourceIdentity, attribute: &str) -> Result<f64>;
}

// =============================================================================
// Tests
// =============================================================================
