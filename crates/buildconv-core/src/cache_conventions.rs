//! Conventions applied to the build cache.

use crate::cache::{ConfigurableBuildCache, LocalBuildCache, RemoteBuildCache};
use crate::ci::CiProvider;
use crate::env::Environment;
use crate::scan_conventions::DEFAULT_SERVER;

/// Applies the organisation-wide conventions to a build cache.
///
/// Both cache tiers are always enabled. The remote server comes from the
/// environment with a strict precedence across the current and legacy
/// variable schemas; once an earlier source yields a value, later sources
/// are never consulted. Pushing stays disabled on developer machines even
/// when a credential happens to be present.
pub struct BuildCacheConventions {
    env: Environment,
}

impl BuildCacheConventions {
    pub fn new(env: Environment) -> Self {
        BuildCacheConventions { env }
    }

    /// Apply the conventions to the given build cache.
    pub fn execute(&self, cache: &mut dyn ConfigurableBuildCache) {
        cache.local(&mut |local: &mut dyn LocalBuildCache| local.enable());
        cache.remote(&mut |remote: &mut dyn RemoteBuildCache| {
            remote.enable();
            remote.set_server(&self.remote_server());
            if self.has_access_key() && CiProvider::detect(&self.env).is_some() {
                remote.enable_push();
            }
        });
    }

    /// Remote cache server: `DEVELOCITY_CACHE_SERVER`, else the legacy
    /// `GRADLE_ENTERPRISE_CACHE_URL` stripped of its `/cache` suffix, else
    /// the shared default.
    fn remote_server(&self) -> String {
        if let Some(server) = self.env.get("DEVELOCITY_CACHE_SERVER") {
            return server.to_string();
        }
        if let Some(server) = self
            .env
            .get("GRADLE_ENTERPRISE_CACHE_URL")
            .and_then(server_of_cache_url)
        {
            return server;
        }
        DEFAULT_SERVER.to_string()
    }

    fn has_access_key(&self) -> bool {
        self.env
            .get("DEVELOCITY_ACCESS_KEY")
            .or_else(|| self.env.get("GRADLE_ENTERPRISE_ACCESS_KEY"))
            .is_some_and(|key| !key.is_empty())
    }
}

/// Reduce a legacy cache URL to the bare server origin by stripping the
/// `/cache/` or `/cache` suffix. A URL with neither suffix resolves nothing.
fn server_of_cache_url(cache_url: &str) -> Option<String> {
    cache_url
        .strip_suffix("/cache/")
        .or_else(|| cache_url.strip_suffix("/cache"))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_suffix_is_stripped_with_and_without_trailing_slash() {
        assert_eq!(
            server_of_cache_url("https://ge.example.com/cache/"),
            Some("https://ge.example.com".to_string())
        );
        assert_eq!(
            server_of_cache_url("https://ge.example.com/cache"),
            Some("https://ge.example.com".to_string())
        );
    }

    #[test]
    fn url_without_cache_suffix_resolves_nothing() {
        assert_eq!(server_of_cache_url("https://ge.example.com"), None);
    }
}
