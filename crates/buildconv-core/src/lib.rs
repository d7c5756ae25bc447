//! Buildconv Core
//!
//! Build-system-agnostic conventions for build scans and build caching:
//! - Detects the execution environment (CI provider, git state, local tools)
//! - Derives a consistent set of tags, values and links for the build scan
//! - Applies the caching and publication policy
//!
//! The engines write through two small capability traits implemented by
//! build-system adapters in collaborator code, and degrade gracefully when
//! any external probe (git, docker, CI variables) is unavailable.

pub mod cache;
pub mod cache_conventions;
pub mod ci;
pub mod env;
pub mod fakes;
pub mod process;
pub mod recording;
pub mod scan;
pub mod scan_conventions;
pub mod telemetry;

pub use cache::{ConfigurableBuildCache, LocalBuildCache, RemoteBuildCache};
pub use cache_conventions::BuildCacheConventions;
pub use ci::CiProvider;
pub use env::Environment;
pub use process::{ProcessRunner, RunFailedError, SystemProcessRunner};
pub use recording::{
    RecordingBuildCache, RecordingBuildScan, RecordingServerConfiguration,
};
pub use scan::{ConfigurableBuildScan, IpObfuscator, ServerConfiguration};
pub use scan_conventions::{
    BuildScanConventions, Publishing, ScanPolicy, DEFAULT_SERVER,
};
pub use telemetry::init_tracing;
