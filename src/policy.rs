//! Operation allow/deny policy.
//!
//! Rules name operations as `Client.operation`, where either side may use
//! glob wildcards:
//!
//! ```text
//! VirtualNetworkClient.delete_vcn   one operation
//! VirtualNetworkClient.*            every operation of a client
//! *.terminate_*                     a verb on any client
//! delete_*                          same as *.delete_*
//! ```
//!
//! Deny rules win over allow rules. A non-empty allow list turns the policy
//! into allowlist mode; an empty policy allows everything.

use crate::config::{Config, PolicyConfig};
use anyhow::Result;
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Outcome of a policy lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Allow,
    Deny,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationPolicy {
    #[serde(default)]
    pub allow: Vec<String>,
    #[serde(default)]
    pub deny: Vec<String>,
}

impl OperationPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &PolicyConfig) -> Self {
        Self {
            allow: config.allow.clone(),
            deny: config.deny.clone(),
        }
    }

    /// Load the `[policy]` table of a TOML file, such as a generated deny list
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self::from_config(&Config::load_from(path)?.policy))
    }

    /// Add an allow rule
    pub fn allow(mut self, pattern: &str) -> Self {
        self.allow.push(pattern.to_string());
        self
    }

    /// Add a deny rule
    pub fn deny(mut self, pattern: &str) -> Self {
        self.deny.push(pattern.to_string());
        self
    }

    /// Append the rules of another policy (e.g. a generated deny list)
    pub fn extend(&mut self, other: OperationPolicy) {
        self.allow.extend(other.allow);
        self.deny.extend(other.deny);
    }

    /// Resolve the decision for an operation; returns the matched rule if any
    pub fn resolve(&self, client: &str, operation: &str) -> (Decision, Option<String>) {
        for pattern in &self.deny {
            if rule_matches(pattern, client, operation) {
                return (Decision::Deny, Some(pattern.clone()));
            }
        }

        for pattern in &self.allow {
            if rule_matches(pattern, client, operation) {
                return (Decision::Allow, Some(pattern.clone()));
            }
        }

        if self.allow.is_empty() {
            (Decision::Allow, None)
        } else {
            (Decision::Deny, Some("not in allow list".to_string()))
        }
    }
}

/// Check a `Client.operation` rule against an operation
pub fn rule_matches(pattern: &str, client: &str, operation: &str) -> bool {
    let (client_pat, op_pat) = match pattern.rsplit_once('.') {
        Some((c, o)) => (c, o),
        None => ("*", pattern),
    };
    part_matches(client_pat, client) && part_matches(op_pat, operation)
}

fn part_matches(pattern: &str, text: &str) -> bool {
    match Pattern::new(pattern) {
        Ok(p) => p.matches(text),
        Err(_) => pattern == text,
    }
}
