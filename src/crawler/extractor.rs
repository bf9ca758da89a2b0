//! Markup extraction by node path
//!
//! A node path names an attribute on the elements matched by a CSS selector,
//! written `<selector>@<attribute>`:
//!
//! | Path | Selects |
//! |------|---------|
//! | `tbody a@href` | every link target inside a table body |
//! | `div#foot > a:nth-of-type(3)@href` | the third footer anchor |
//! | `div#rightcol > img@src` | image sources in the right column |
//!
//! Documents are parsed once per call and the DOM is dropped before the
//! call returns, so extraction results can be carried across `.await`
//! points in spawned tasks.

use crate::ParseError;
use scraper::{Html, Selector};
use std::fmt;
use std::str::FromStr;

/// Values matched by a node path, in document order
///
/// The sequence is consumed once; extracting again means fetching again.
pub type Nodes = std::vec::IntoIter<String>;

/// A compiled `<selector>@<attribute>` expression
#[derive(Debug, Clone)]
pub struct NodePath {
    raw: String,
    selector: Selector,
    attribute: String,
}

impl NodePath {
    /// Compiles a node path
    ///
    /// # Returns
    ///
    /// * `Ok(NodePath)` - The selector compiled and an attribute was named
    /// * `Err(ParseError::InvalidPath)` - Missing `@attribute` or bad CSS
    ///
    /// # Example
    ///
    /// ```
    /// use bbs_harvest::crawler::NodePath;
    ///
    /// let path = NodePath::parse("tbody a@href").unwrap();
    /// assert_eq!(path.attribute(), "href");
    /// assert!(NodePath::parse("tbody a").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let invalid = |message: String| ParseError::InvalidPath {
            path: raw.to_string(),
            message,
        };

        let (css, attribute) = raw
            .rsplit_once('@')
            .ok_or_else(|| invalid("expected '<selector>@<attribute>'".to_string()))?;
        let css = css.trim();
        let attribute = attribute.trim();

        if css.is_empty() {
            return Err(invalid("selector is empty".to_string()));
        }
        if attribute.is_empty() {
            return Err(invalid("attribute is empty".to_string()));
        }

        let selector = Selector::parse(css).map_err(|e| invalid(format!("{:?}", e)))?;

        Ok(Self {
            raw: raw.to_string(),
            selector,
            attribute: attribute.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }
}

impl FromStr for NodePath {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Extracts every value `path` selects from an HTML document
///
/// Elements matching the selector but lacking the attribute are skipped.
/// No match yields an empty sequence.
///
/// # Example
///
/// ```
/// use bbs_harvest::crawler::{extract, NodePath};
///
/// let html = r#"<table><tbody><tr><td><a href="a.png">a</a></td></tr></tbody></table>"#;
/// let path = NodePath::parse("tbody a@href").unwrap();
/// let values: Vec<String> = extract(html, &path).collect();
/// assert_eq!(values, vec!["a.png".to_string()]);
/// ```
pub fn extract(html: &str, path: &NodePath) -> Nodes {
    let document = Html::parse_document(html);
    let values: Vec<String> = document
        .select(&path.selector)
        .filter_map(|element| element.value().attr(&path.attribute))
        .map(str::to_string)
        .collect();
    values.into_iter()
}

/// Returns the first value `path` selects, if any
pub fn first(html: &str, path: &NodePath) -> Option<String> {
    let document = Html::parse_document(html);
    let value = document
        .select(&path.selector)
        .find_map(|element| element.value().attr(&path.attribute))
        .map(str::to_string);
    value
}
