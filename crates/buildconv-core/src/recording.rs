//! In-memory capability implementations that record applied conventions.
//!
//! These materialise the convention outcome as plain data: tests assert on
//! it, and the CLI serialises it to show what the engines would do to a real
//! build without a build system in the loop.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cache::{ConfigurableBuildCache, LocalBuildCache, RemoteBuildCache};
use crate::scan::{ConfigurableBuildScan, IpObfuscator, ServerConfiguration};

// ---------------------------------------------------------------------------
// RecordingBuildScan
// ---------------------------------------------------------------------------

/// Build scan that records every write made to it.
///
/// Tags deduplicate; values and links are last-write-wins per name. Deferred
/// configurers run immediately, which satisfies the contract that background
/// work completes before the scan is finalised.
#[derive(Debug, Default, Serialize)]
pub struct RecordingBuildScan {
    pub tags: Vec<String>,
    pub values: BTreeMap<String, String>,
    pub links: BTreeMap<String, String>,
    pub capture_input_files: Option<bool>,
    pub publish_if_authenticated: bool,
    pub upload_in_background: Option<bool>,
    #[serde(skip)]
    pub ip_obfuscator: Option<IpObfuscator>,
}

impl RecordingBuildScan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the scan carries the given tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

impl ConfigurableBuildScan for RecordingBuildScan {
    fn capture_input_files(&mut self, capture: bool) {
        self.capture_input_files = Some(capture);
    }

    fn obfuscate_ip_addresses(&mut self, obfuscator: IpObfuscator) {
        self.ip_obfuscator = Some(obfuscator);
    }

    fn publish_if_authenticated(&mut self) {
        self.publish_if_authenticated = true;
    }

    fn upload_in_background(&mut self, enabled: bool) {
        self.upload_in_background = Some(enabled);
    }

    fn link(&mut self, name: &str, url: &str) {
        self.links.insert(name.to_string(), url.to_string());
    }

    fn tag(&mut self, tag: &str) {
        if !self.has_tag(tag) {
            self.tags.push(tag.to_string());
        }
    }

    fn value(&mut self, name: &str, value: &str) {
        self.values.insert(name.to_string(), value.to_string());
    }

    fn background(&mut self, configurer: &mut dyn FnMut(&mut dyn ConfigurableBuildScan)) {
        configurer(self);
    }
}

// ---------------------------------------------------------------------------
// RecordingServerConfiguration
// ---------------------------------------------------------------------------

/// Server configuration holding the address in memory.
#[derive(Debug, Default, Serialize)]
pub struct RecordingServerConfiguration {
    pub server: Option<String>,
}

impl RecordingServerConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start out pointing at the given server, as a collaborator that has
    /// already configured one would.
    pub fn with_server(server: impl Into<String>) -> Self {
        RecordingServerConfiguration {
            server: Some(server.into()),
        }
    }
}

impl ServerConfiguration for RecordingServerConfiguration {
    fn server(&self) -> Option<String> {
        self.server.clone()
    }

    fn set_server(&mut self, server: &str) {
        self.server = Some(server.to_string());
    }
}

// ---------------------------------------------------------------------------
// RecordingBuildCache
// ---------------------------------------------------------------------------

/// Local cache tier recording whether it was enabled.
#[derive(Debug, Default, Serialize)]
pub struct RecordingLocalCache {
    pub enabled: bool,
}

impl LocalBuildCache for RecordingLocalCache {
    fn enable(&mut self) {
        self.enabled = true;
    }
}

/// Remote cache tier recording enablement, push and server address.
#[derive(Debug, Default, Serialize)]
pub struct RecordingRemoteCache {
    pub enabled: bool,
    pub push_enabled: bool,
    pub server: Option<String>,
}

impl RemoteBuildCache for RecordingRemoteCache {
    fn enable(&mut self) {
        self.enabled = true;
    }

    fn enable_push(&mut self) {
        self.push_enabled = true;
    }

    fn set_server(&mut self, server: &str) {
        self.server = Some(server.to_string());
    }
}

/// Build cache that records every write made to either tier.
#[derive(Debug, Default, Serialize)]
pub struct RecordingBuildCache {
    pub local: RecordingLocalCache,
    pub remote: RecordingRemoteCache,
}

impl RecordingBuildCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigurableBuildCache for RecordingBuildCache {
    fn local(&mut self, configurer: &mut dyn FnMut(&mut dyn LocalBuildCache)) {
        configurer(&mut self.local);
    }

    fn remote(&mut self, configurer: &mut dyn FnMut(&mut dyn RemoteBuildCache)) {
        configurer(&mut self.remote);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_deduplicate() {
        let mut scan = RecordingBuildScan::new();
        scan.tag("dirty");
        scan.tag("dirty");
        assert_eq!(scan.tags, vec!["dirty"]);
    }

    #[test]
    fn values_and_links_are_last_write_wins() {
        let mut scan = RecordingBuildScan::new();
        scan.value("Git branch", "main");
        scan.value("Git branch", "release");
        scan.link("CI build", "https://ci.example.com/1");
        scan.link("CI build", "https://ci.example.com/2");
        assert_eq!(scan.values["Git branch"], "release");
        assert_eq!(scan.links["CI build"], "https://ci.example.com/2");
    }

    #[test]
    fn background_runs_before_returning() {
        let mut scan = RecordingBuildScan::new();
        scan.background(&mut |scan: &mut dyn ConfigurableBuildScan| scan.tag("deferred"));
        assert!(scan.has_tag("deferred"));
    }

    #[test]
    fn recorded_outcome_serialises_to_json() {
        let mut scan = RecordingBuildScan::new();
        scan.tag("Local");
        scan.value("Git commit", "79ce52f8");
        let json = serde_json::to_value(&scan).unwrap();
        assert_eq!(json["tags"][0], "Local");
        assert_eq!(json["values"]["Git commit"], "79ce52f8");

        let mut cache = RecordingBuildCache::new();
        cache.local(&mut |local: &mut dyn LocalBuildCache| local.enable());
        let json = serde_json::to_value(&cache).unwrap();
        assert_eq!(json["local"]["enabled"], true);
        assert_eq!(json["remote"]["enabled"], false);
    }

    #[test]
    fn cache_configurers_reach_both_tiers() {
        let mut cache = RecordingBuildCache::new();
        cache.local(&mut |local: &mut dyn LocalBuildCache| local.enable());
        cache.remote(&mut |remote: &mut dyn RemoteBuildCache| {
            remote.enable();
            remote.set_server("https://ge.example.com");
        });
        assert!(cache.local.enabled);
        assert!(cache.remote.enabled);
        assert_eq!(cache.remote.server.as_deref(), Some("https://ge.example.com"));
        assert!(!cache.remote.push_enabled);
    }
}
