//! Capability surface a build scan exposes to the conventions.
//!
//! One adapter per build ecosystem implements these traits in collaborator
//! code; the engine only ever writes through them.

use std::net::IpAddr;

/// Transform applied to the IP addresses captured in a scan before they are
/// persisted.
pub type IpObfuscator = fn(&[IpAddr]) -> Vec<String>;

/// A build scan that can be configured, build system unspecified.
pub trait ConfigurableBuildScan {
    /// Whether input file fingerprints for tasks or goals are captured.
    fn capture_input_files(&mut self, capture: bool);

    /// Install the transform applied to captured IP addresses.
    fn obfuscate_ip_addresses(&mut self, obfuscator: IpObfuscator);

    /// Restrict publication to authenticated sessions.
    fn publish_if_authenticated(&mut self);

    /// Whether the scan uploads in the background after the build finishes.
    fn upload_in_background(&mut self, enabled: bool);

    /// Add a named link to the scan. Last write per name wins.
    fn link(&mut self, name: &str, url: &str);

    /// Add a tag to the scan. Tags are a set; repeats are harmless.
    fn tag(&mut self, tag: &str);

    /// Record a named value on the scan. Last write per name wins.
    fn value(&mut self, name: &str, value: &str);

    /// Defer configuration work, typically so the build itself is not held
    /// up by external probes.
    ///
    /// Implementations must run the configurer before the scan is finalised
    /// or published; running it immediately is a valid implementation.
    /// Callers must not assume any ordering between deferred configurers.
    fn background(&mut self, configurer: &mut dyn FnMut(&mut dyn ConfigurableBuildScan));
}

/// The address of the server scans are published to.
pub trait ServerConfiguration {
    /// Currently configured server address, if any.
    fn server(&self) -> Option<String>;

    /// Point the scan at the given server.
    fn set_server(&mut self, server: &str);
}
