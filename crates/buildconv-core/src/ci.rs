//! Detection of known continuous integration environments.

use crate::env::Environment;

/// A continuous integration provider the conventions know how to recognise.
///
/// Detection walks [`CiProvider::CATALOGUE`] in order and returns the first
/// provider whose signal variable is present, so when several CI systems
/// leave their variables behind (nested CI), the earlier entry wins. The
/// order is part of the contract; do not reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CiProvider {
    Bamboo,
    CircleCi,
    GitHubActions,
    Jenkins,
    Concourse,
}

impl CiProvider {
    /// Every known provider, in detection precedence order.
    pub const CATALOGUE: [CiProvider; 5] = [
        CiProvider::Bamboo,
        CiProvider::CircleCi,
        CiProvider::GitHubActions,
        CiProvider::Jenkins,
        CiProvider::Concourse,
    ];

    /// Return the provider whose signal variable is present, if any.
    ///
    /// Presence of the key is sufficient; the value may be empty (Concourse
    /// sets `CI` with no meaningful value).
    pub fn detect(env: &Environment) -> Option<CiProvider> {
        CiProvider::CATALOGUE
            .into_iter()
            .find(|provider| env.contains(provider.signal_variable()))
    }

    /// The environment variable whose presence identifies this provider.
    pub fn signal_variable(self) -> &'static str {
        match self {
            CiProvider::Bamboo => "bamboo_resultsUrl",
            CiProvider::CircleCi => "CIRCLE_BUILD_URL",
            CiProvider::GitHubActions => "GITHUB_ACTIONS",
            CiProvider::Jenkins => "JENKINS_URL",
            CiProvider::Concourse => "CI",
        }
    }

    /// Derive the URL of the current build, when the provider exposes one.
    ///
    /// GitHub Actions composes its URL from three further variables; absent
    /// inputs yield literal `null` segments rather than suppressing the URL
    /// (long-standing observed behaviour, preserved).
    pub fn build_url(self, env: &Environment) -> Option<String> {
        match self {
            CiProvider::Bamboo | CiProvider::CircleCi => {
                env.get(self.signal_variable()).map(str::to_string)
            }
            CiProvider::GitHubActions => Some(format!(
                "{}/{}/actions/runs/{}",
                env.get("GITHUB_SERVER_URL").unwrap_or("null"),
                env.get("GITHUB_REPOSITORY").unwrap_or("null"),
                env.get("GITHUB_RUN_ID").unwrap_or("null"),
            )),
            CiProvider::Jenkins => env.get("BUILD_URL").map(str::to_string),
            CiProvider::Concourse => None,
        }
    }
}

impl std::fmt::Display for CiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CiProvider::Bamboo => "Bamboo",
            CiProvider::CircleCi => "CircleCI",
            CiProvider::GitHubActions => "GitHub Actions",
            CiProvider::Jenkins => "Jenkins",
            CiProvider::Concourse => "Concourse",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_detected_in_an_empty_environment() {
        assert_eq!(CiProvider::detect(&Environment::empty()), None);
    }

    #[test]
    fn bamboo_detected_from_results_url() {
        let env = Environment::from([("bamboo_resultsUrl", "https://bamboo.example.com")]);
        assert_eq!(CiProvider::detect(&env), Some(CiProvider::Bamboo));
    }

    #[test]
    fn circle_ci_detected_from_build_url() {
        let env = Environment::from([("CIRCLE_BUILD_URL", "https://circleci.example.com/123")]);
        assert_eq!(CiProvider::detect(&env), Some(CiProvider::CircleCi));
    }

    #[test]
    fn github_actions_detected_from_marker_variable() {
        let env = Environment::from([("GITHUB_ACTIONS", "true")]);
        assert_eq!(CiProvider::detect(&env), Some(CiProvider::GitHubActions));
    }

    #[test]
    fn jenkins_detected_from_jenkins_url() {
        let env = Environment::from([("JENKINS_URL", "https://jenkins.example.com")]);
        assert_eq!(CiProvider::detect(&env), Some(CiProvider::Jenkins));
    }

    #[test]
    fn concourse_detected_from_bare_ci_variable() {
        let env = Environment::from([("CI", "")]);
        assert_eq!(CiProvider::detect(&env), Some(CiProvider::Concourse));
    }

    #[test]
    fn earlier_catalogue_entry_wins_when_two_signals_are_present() {
        let env = Environment::from([
            ("CI", "true"),
            ("GITHUB_ACTIONS", "true"),
        ]);
        assert_eq!(CiProvider::detect(&env), Some(CiProvider::GitHubActions));

        let env = Environment::from([
            ("JENKINS_URL", "https://jenkins.example.com"),
            ("bamboo_resultsUrl", "https://bamboo.example.com"),
        ]);
        assert_eq!(CiProvider::detect(&env), Some(CiProvider::Bamboo));
    }

    #[test]
    fn bamboo_build_url_is_the_signal_value() {
        let env = Environment::from([("bamboo_resultsUrl", "https://bamboo.example.com/r/1")]);
        assert_eq!(
            CiProvider::Bamboo.build_url(&env),
            Some("https://bamboo.example.com/r/1".to_string())
        );
    }

    #[test]
    fn github_actions_build_url_is_composed() {
        let env = Environment::from([
            ("GITHUB_SERVER_URL", "https://github.com"),
            ("GITHUB_REPOSITORY", "example/project"),
            ("GITHUB_RUN_ID", "1234567890"),
        ]);
        assert_eq!(
            CiProvider::GitHubActions.build_url(&env),
            Some("https://github.com/example/project/actions/runs/1234567890".to_string())
        );
    }

    #[test]
    fn github_actions_build_url_keeps_null_segments_for_missing_inputs() {
        let env = Environment::from([("GITHUB_SERVER_URL", "https://github.com")]);
        assert_eq!(
            CiProvider::GitHubActions.build_url(&env),
            Some("https://github.com/null/actions/runs/null".to_string())
        );
    }

    #[test]
    fn jenkins_build_url_comes_from_a_separate_variable() {
        let env = Environment::from([
            ("JENKINS_URL", "https://jenkins.example.com"),
            ("BUILD_URL", "https://jenkins.example.com/job/project/42"),
        ]);
        assert_eq!(
            CiProvider::Jenkins.build_url(&env),
            Some("https://jenkins.example.com/job/project/42".to_string())
        );
        assert_eq!(
            CiProvider::Jenkins.build_url(&Environment::from([("JENKINS_URL", "x")])),
            None
        );
    }

    #[test]
    fn concourse_has_no_build_url() {
        let env = Environment::from([("CI", "true")]);
        assert_eq!(CiProvider::Concourse.build_url(&env), None);
    }

    #[test]
    fn display_names() {
        assert_eq!(CiProvider::Bamboo.to_string(), "Bamboo");
        assert_eq!(CiProvider::CircleCi.to_string(), "CircleCI");
        assert_eq!(CiProvider::GitHubActions.to_string(), "GitHub Actions");
        assert_eq!(CiProvider::Jenkins.to_string(), "Jenkins");
        assert_eq!(CiProvider::Concourse.to_string(), "Concourse");
    }
}
