//! Set of enabled pipeline stages for one scan

use crate::core::capability::Capability;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct ScanProfile {
    pub enabled: HashSet<Capability>,
}

impl Default for ScanProfile {
    fn default() -> Self {
        Self::all()
    }
}

impl ScanProfile {
    /// Create a profile with every stage enabled
    pub fn all() -> Self {
        use Capability::*;
        Self {
            enabled: [Crawl, ContextDetection, DefenseDetection, AdaptivePayloads]
                .into_iter()
                .collect(),
        }
    }

    /// Enable a specific capability
    pub fn enable(&mut self, cap: Capability) {
        self.enabled.insert(cap);
    }

    /// Disable a specific capability
    pub fn disable(&mut self, cap: Capability) {
        self.enabled.remove(&cap);
    }

    /// Enable or disable depending on `on`
    pub fn set(&mut self, cap: Capability, on: bool) {
        if on {
            self.enable(cap);
        } else {
            self.disable(cap);
        }
    }

    /// Check if a capability is enabled
    pub fn has(&self, cap: Capability) -> bool {
        self.enabled.contains(&cap)
    }
}
