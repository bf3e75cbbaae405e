use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;
use tracing::trace;

use crate::{
    error::DownloadError,
    http::Http,
    traits::{Asset, Platform, Release},
};

const PER_PAGE: u32 = 100;
const MAX_PAGES: u32 = 1000;

/// Everything but RFC 3986 unreserved characters, so `/` in a project path becomes `%2F`.
const PROJECT_ID: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// GitLab REST API client for project releases.
#[derive(Debug, Clone)]
pub struct GitLab {
    base_url: String,
    token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitLabRelease {
    pub tag_name: String,
    pub created_at: String,
    #[serde(default)]
    pub assets: GitLabAssets,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitLabAssets {
    #[serde(default)]
    pub links: Vec<GitLabAsset>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitLabAsset {
    pub name: String,
    pub url: String,
}

impl GitLab {
    pub const TOKEN_ENV: &'static str = "GITLAB_TOKEN";

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn releases_url(&self, project: &str, page: u32) -> String {
        let encoded = utf8_percent_encode(project, PROJECT_ID);
        format!(
            "{}/api/v4/projects/{}/releases?page={}&per_page={}",
            self.base_url, encoded, page, PER_PAGE
        )
    }

    /// Fetches a single page of releases, 1-based.
    pub fn fetch_release_page(
        &self,
        project: &str,
        page: u32,
    ) -> Result<Vec<GitLabRelease>, DownloadError> {
        let url = self.releases_url(project, page);
        trace!("fetching {url}");
        Http::json(&url, self.token.as_deref())
    }
}

impl Platform for GitLab {
    type Release = GitLabRelease;

    fn fetch_releases(&self, project: &str) -> Result<Vec<Self::Release>, DownloadError> {
        let mut releases = Vec::new();

        for page in 1..=MAX_PAGES {
            let batch = self.fetch_release_page(project, page)?;
            if batch.is_empty() {
                break;
            }
            releases.extend(batch);
        }

        Ok(releases)
    }
}

impl Release for GitLabRelease {
    type Asset = GitLabAsset;

    fn tag(&self) -> &str {
        &self.tag_name
    }

    fn created_at(&self) -> &str {
        &self.created_at
    }

    fn assets(&self) -> &[Self::Asset] {
        &self.assets.links
    }
}

impl Asset for GitLabAsset {
    fn name(&self) -> &str {
        &self.name
    }

    fn url(&self) -> &str {
        &self.url
    }
}
