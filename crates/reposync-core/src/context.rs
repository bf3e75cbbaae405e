use reposync_config::settings::RepoSettings;
use reposync_dl::{gitlab::GitLab, traits::Platform};

/// Shared state for one invocation: resolved settings plus the forge client.
pub struct RepoContext<P: Platform = GitLab> {
    settings: RepoSettings,
    platform: Option<P>,
}

impl RepoContext<GitLab> {
    /// Creates a context talking to the configured forge.
    ///
    /// Release listing requires a token; without one the context has no forge
    /// and forge projects are skipped during sync.
    pub fn new(settings: RepoSettings) -> Self {
        let forge = GitLab::new(&settings.forge_url).token(settings.forge_token.clone());
        let platform = forge.has_token().then_some(forge);
        Self { settings, platform }
    }
}

impl<P: Platform> RepoContext<P> {
    pub fn with_platform(settings: RepoSettings, platform: Option<P>) -> Self {
        Self { settings, platform }
    }

    pub fn settings(&self) -> &RepoSettings {
        &self.settings
    }

    pub fn platform(&self) -> Option<&P> {
        self.platform.as_ref()
    }
}
