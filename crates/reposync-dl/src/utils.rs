use percent_encoding::percent_decode_str;
use url::Url;

/// Extract the file name from a URL path, ignoring any query string or fragment.
///
/// Falls back to plain string splitting when the URL does not parse, so relative or
/// slightly malformed entries still yield their last path component.
pub fn filename_from_url(url: &str) -> Option<String> {
    let from_parsed = Url::parse(url).ok().and_then(|u| {
        u.path_segments()
            .and_then(|mut s| s.next_back())
            .filter(|s| !s.is_empty())
            .map(decode)
    });

    from_parsed.or_else(|| {
        url.split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').next())
            .filter(|s| !s.is_empty())
            .map(decode)
    })
}

fn decode(segment: &str) -> String {
    percent_decode_str(segment)
        .decode_utf8()
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}
