use crate::ParseError;
use url::Url;

/// Resolves an href found in markup against a base URL
///
/// Absolute hrefs are returned unchanged; relative ones follow RFC 3986
/// reference resolution, so `base` should end with `/` when it names a
/// directory.
///
/// # Examples
///
/// ```
/// use bbs_harvest::url::resolve_link;
/// use url::Url;
///
/// let base = Url::parse("http://example.com/mee/").unwrap();
/// let next = resolve_link(&base, "page2.html").unwrap();
/// assert_eq!(next.as_str(), "http://example.com/mee/page2.html");
/// ```
pub fn resolve_link(base: &Url, href: &str) -> Result<Url, ParseError> {
    base.join(href.trim()).map_err(|source| ParseError::InvalidUrl {
        href: href.to_string(),
        base: base.to_string(),
        source,
    })
}

/// Builds the URL of listing page `index` (zero-based)
///
/// Boards number their pages from one, so index 0 becomes `?page=1`.
pub fn listing_page_url(board_url: &Url, index: usize) -> Url {
    let mut url = board_url.clone();
    url.query_pairs_mut()
        .append_pair("page", &(index + 1).to_string());
    url
}
