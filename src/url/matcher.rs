/// Checks if a reference ends with one of the accepted suffixes
///
/// Matching is exact and case-sensitive: `.png` accepts `a.png` but neither
/// `a.PNG` nor `a.apng.bak`. Query strings are not stripped, so `a.png?x=1`
/// is rejected as well.
///
/// # Examples
///
/// ```
/// use bbs_harvest::url::has_accepted_suffix;
///
/// let media = [".png".to_string(), ".jpg".to_string()];
/// assert!(has_accepted_suffix("img/a.png", &media));
/// assert!(has_accepted_suffix("img/b.jpg", &media));
/// assert!(!has_accepted_suffix("img/c.PNG", &media));
/// assert!(!has_accepted_suffix("img/d.jpeg", &media));
/// ```
pub fn has_accepted_suffix<S: AsRef<str>>(reference: &str, suffixes: &[S]) -> bool {
    suffixes
        .iter()
        .any(|suffix| reference.ends_with(suffix.as_ref()))
}
