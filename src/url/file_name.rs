use url::Url;

/// Extracts the file name an asset is stored under
///
/// This is the last non-empty path segment, percent-decoding left as is.
/// Returns `None` for URLs without one (`http://example.com/`) or whose
/// last segment is a relative directory marker.
///
/// # Examples
///
/// ```
/// use bbs_harvest::url::file_name;
/// use url::Url;
///
/// let url = Url::parse("http://example.com/up/src/1420000000.png").unwrap();
/// assert_eq!(file_name(&url), Some("1420000000.png".to_string()));
/// ```
pub fn file_name(url: &Url) -> Option<String> {
    url.path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .filter(|segment| *segment != "." && *segment != "..")
        .map(str::to_string)
}
