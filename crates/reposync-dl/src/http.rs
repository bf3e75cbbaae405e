use ureq::{http::header::AUTHORIZATION, http::Response, Body};

use crate::{error::DownloadError, http_client::agent};

pub struct Http;

impl Http {
    /// Issues a GET and fails on any non-2xx status.
    pub fn fetch(url: &str) -> Result<Response<Body>, DownloadError> {
        let resp = agent().get(url).call()?;
        ensure_success(resp, url)
    }

    /// Issues an authenticated GET and decodes the JSON body.
    pub fn json<T: serde::de::DeserializeOwned>(
        url: &str,
        token: Option<&str>,
    ) -> Result<T, DownloadError> {
        let mut req = agent().get(url);
        if let Some(token) = token {
            req = req.header(AUTHORIZATION, &format!("Bearer {token}"));
        }

        let mut resp = ensure_success(req.call()?, url)?;
        resp.body_mut()
            .read_json()
            .map_err(|_| DownloadError::InvalidResponse)
    }
}

fn ensure_success(resp: Response<Body>, url: &str) -> Result<Response<Body>, DownloadError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(DownloadError::HttpError {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(resp)
}
