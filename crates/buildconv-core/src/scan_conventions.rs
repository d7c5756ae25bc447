//! Conventions applied to build scans for every build, CI or local.

use std::net::IpAddr;

use tracing::debug;

use crate::ci::CiProvider;
use crate::env::Environment;
use crate::process::ProcessRunner;
use crate::scan::{ConfigurableBuildScan, ServerConfiguration};

/// Server that scans are published to and cache entries are fetched from,
/// unless the environment says otherwise.
pub const DEFAULT_SERVER: &str = "https://ge.spring.io";

/// Literal that replaces every IP address captured in a scan.
const OBFUSCATED_IP: &str = "0.0.0.0";

/// How scan publication is configured before enrichment runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Publishing {
    /// Publish authenticated scans to [`DEFAULT_SERVER`].
    SharedServer,
    /// Leave the build ecosystem's own publication defaults untouched,
    /// for builds that publish anonymously.
    EcosystemDefaults,
}

/// Collaborator-supplied extension points for the scan conventions.
///
/// Publication behaviour and the reported JDK version travel here as plain
/// values; a collaborator that resolves a requested toolchain passes that
/// version instead of the runtime's own.
#[derive(Debug, Clone)]
pub struct ScanPolicy {
    publishing: Publishing,
    jdk_version: String,
}

impl ScanPolicy {
    /// Authenticated publication to the shared server. This is the policy
    /// applied everywhere unless a build opts into anonymous publication.
    pub fn shared_server(jdk_version: impl Into<String>) -> Self {
        ScanPolicy {
            publishing: Publishing::SharedServer,
            jdk_version: jdk_version.into(),
        }
    }

    /// Anonymous publication using the ecosystem's own defaults.
    pub fn anonymous(jdk_version: impl Into<String>) -> Self {
        ScanPolicy {
            publishing: Publishing::EcosystemDefaults,
            jdk_version: jdk_version.into(),
        }
    }

    pub fn publishing(&self) -> Publishing {
        self.publishing
    }

    pub fn jdk_version(&self) -> &str {
        &self.jdk_version
    }
}

/// Applies the organisation-wide conventions to a build scan.
///
/// Holds nothing but its constructor-injected environment snapshot, process
/// runner and policy; every invocation of [`execute`](Self::execute) writes
/// only through the capabilities it is handed. Each enrichment step is
/// individually failure-tolerant: a probe that fails leaves its tag or value
/// unset and never aborts the surrounding build.
pub struct BuildScanConventions<R> {
    process_runner: R,
    env: Environment,
    policy: ScanPolicy,
}

impl<R: ProcessRunner> BuildScanConventions<R> {
    pub fn new(process_runner: R, env: Environment, policy: ScanPolicy) -> Self {
        BuildScanConventions {
            process_runner,
            env,
            policy,
        }
    }

    /// Apply the conventions to the given server configuration and scan.
    pub fn execute(
        &self,
        server: &mut dyn ServerConfiguration,
        scan: &mut dyn ConfigurableBuildScan,
    ) {
        scan.obfuscate_ip_addresses(|addresses: &[IpAddr]| {
            addresses.iter().map(|_| OBFUSCATED_IP.to_string()).collect()
        });
        self.configure_publishing(server, scan);
        let ci = CiProvider::detect(&self.env);
        self.tag_build_scan(ci, scan);
        let server_address = server.server();
        scan.background(&mut |scan: &mut dyn ConfigurableBuildScan| {
            self.add_git_metadata(server_address.as_deref(), scan)
        });
        scan.background(&mut |scan: &mut dyn ConfigurableBuildScan| {
            self.add_docker_metadata(scan)
        });
        scan.background(&mut |scan: &mut dyn ConfigurableBuildScan| {
            self.add_docker_compose_metadata(scan)
        });
        self.add_ci_metadata(ci, scan);
        scan.upload_in_background(ci.is_none());
        scan.capture_input_files(true);
    }

    fn configure_publishing(
        &self,
        server: &mut dyn ServerConfiguration,
        scan: &mut dyn ConfigurableBuildScan,
    ) {
        match self.policy.publishing() {
            Publishing::SharedServer => {
                scan.publish_if_authenticated();
                server.set_server(DEFAULT_SERVER);
            }
            Publishing::EcosystemDefaults => {}
        }
    }

    fn tag_build_scan(&self, ci: Option<CiProvider>, scan: &mut dyn ConfigurableBuildScan) {
        scan.tag(if ci.is_some() { "CI" } else { "Local" });
        scan.tag(&format!("JDK-{}", self.policy.jdk_version()));
        scan.tag(std::env::consts::OS);
    }

    fn add_git_metadata(&self, server: Option<&str>, scan: &mut dyn ConfigurableBuildScan) {
        if let Some(commit) = self.probe(&["git", "rev-parse", "--short=8", "--verify", "HEAD"]) {
            scan.value("Git commit", &commit);
            if let Some(server) = server {
                let url = format!("{server}{}", search_url("Git commit", &commit));
                scan.link("Git commit build scans", &url);
            }
        }
        if let Some(branch) = self.branch() {
            scan.tag(&branch);
            scan.value("Git branch", &branch);
        }
        if let Some(status) = self.probe(&["git", "status", "--porcelain"]) {
            scan.tag("dirty");
            scan.value("Git status", &status);
        }
    }

    fn add_docker_metadata(&self, scan: &mut dyn ConfigurableBuildScan) {
        if let Some(version) = self.probe(&["docker", "--version"]) {
            scan.value("Docker", &version);
        }
    }

    fn add_docker_compose_metadata(&self, scan: &mut dyn ConfigurableBuildScan) {
        if let Some(version) = self.probe(&["docker", "compose", "version"]) {
            scan.value("Docker Compose", &version);
        }
    }

    fn add_ci_metadata(&self, ci: Option<CiProvider>, scan: &mut dyn ConfigurableBuildScan) {
        let Some(ci) = ci else { return };
        if let Some(build_url) = ci.build_url(&self.env) {
            if !build_url.is_empty() {
                scan.link("CI build", &build_url);
            }
        }
        scan.value("CI provider", &ci.to_string());
    }

    /// The branch the build runs on: an explicit `BRANCH` variable wins over
    /// asking git. A present-but-empty `BRANCH` suppresses the probe too.
    fn branch(&self) -> Option<String> {
        if let Some(branch) = self.env.get("BRANCH") {
            return (!branch.is_empty()).then(|| branch.to_string());
        }
        self.probe(&["git", "rev-parse", "--abbrev-ref", "HEAD"])
    }

    /// Run a probe, reducing it to trimmed, non-empty standard output.
    ///
    /// A failed run (tool missing, non-zero exit) is indistinguishable from
    /// a run that produced no output.
    fn probe(&self, command: &[&str]) -> Option<String> {
        match self.process_runner.run(command) {
            Ok(output) => {
                let output = output.trim();
                (!output.is_empty()).then(|| output.to_string())
            }
            Err(error) => {
                debug!(command = %command.join(" "), %error, "probe failed");
                None
            }
        }
    }
}

fn search_url(name: &str, value: &str) -> String {
    format!(
        "/scans?search.names={}&search.values={}",
        form_encode(name),
        form_encode(value)
    )
}

/// UTF-8 form encoding: space becomes `+`, unreserved characters pass
/// through, every other byte is percent-escaped.
fn form_encode(input: &str) -> String {
    use std::fmt::Write;

    let mut encoded = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'*' => {
                encoded.push(byte as char)
            }
            b' ' => encoded.push('+'),
            _ => {
                let _ = write!(encoded, "%{byte:02X}");
            }
        }
    }
    encoded
}
