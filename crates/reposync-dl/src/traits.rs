use crate::error::DownloadError;

pub trait Asset: Clone {
    fn name(&self) -> &str;
    fn url(&self) -> &str;
}

pub trait Release {
    type Asset: Asset;

    fn tag(&self) -> &str;
    /// Creation timestamp in RFC 3339 form.
    fn created_at(&self) -> &str;
    fn assets(&self) -> &[Self::Asset];
}

/// A code forge that publishes releases for its projects.
pub trait Platform {
    type Release: Release;

    /// Fetches every release of `project`, across all pages, in server order.
    fn fetch_releases(&self, project: &str) -> Result<Vec<Self::Release>, DownloadError>;
}
