//! Reading and retargeting the prev/next links embedded in a page.
//!
//! Links are located with two CSS selectors (default `a.prev` / `a.next`)
//! and rewritten in a single streaming pass with `lol_html`. A rewrite only
//! changes `href` attributes of links that already exist; it never adds or
//! removes elements.
//!
//! Keys and URLs follow the directory-index convention:
//!
//! ```text
//! key  2023-11-01/index.html   <->   url  /2023-11-01/
//! key  index.html              <->   url  /
//! key  css/site.css            <->   url  /css/site.css
//! ```

use std::borrow::Cow;

use lol_html::errors::RewritingError;
use lol_html::{element, HtmlRewriter, Selector, Settings};

use daybook_core::{DayKey, SelectorConfig};

use crate::error::SyncError;

/// File name served for a directory URL.
pub const DIRECTORY_INDEX: &str = "index.html";

/// The pagination links found in one page, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pagination {
    pub prev: Vec<String>,
    pub next: Vec<String>,
}

/// Extracts and rewrites pagination links for a pair of selectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationCodec {
    prev: String,
    next: String,
}

impl Default for PaginationCodec {
    fn default() -> Self {
        let selectors = SelectorConfig::default();
        Self {
            prev: selectors.prev,
            next: selectors.next,
        }
    }
}

impl PaginationCodec {
    /// Fails with [`SyncError::InvalidArgument`] when either selector is not
    /// valid CSS supported by the rewriter.
    pub fn new(prev: impl Into<String>, next: impl Into<String>) -> Result<Self, SyncError> {
        let codec = Self {
            prev: prev.into(),
            next: next.into(),
        };
        for selector in [&codec.prev, &codec.next] {
            selector.parse::<Selector>().map_err(|e| {
                SyncError::InvalidArgument(format!("invalid selector '{selector}': {e}"))
            })?;
        }
        Ok(codec)
    }

    pub fn from_config(selectors: &SelectorConfig) -> Result<Self, SyncError> {
        Self::new(selectors.prev.clone(), selectors.next.clone())
    }

    /// Collect the `href` of every prev and next link in `markup`.
    /// Matching elements without an `href` are ignored.
    pub fn extract(&self, markup: &[u8]) -> Result<Pagination, RewritingError> {
        let mut prev = Vec::new();
        let mut next = Vec::new();

        let mut rewriter = HtmlRewriter::new(
            Settings {
                element_content_handlers: vec![
                    element!(self.prev.as_str(), |el| {
                        if let Some(href) = el.get_attribute("href") {
                            prev.push(href);
                        }
                        Ok(())
                    }),
                    element!(self.next.as_str(), |el| {
                        if let Some(href) = el.get_attribute("href") {
                            next.push(href);
                        }
                        Ok(())
                    }),
                ],
                ..Settings::default()
            },
            |_: &[u8]| {},
        );
        rewriter.write(markup)?;
        rewriter.end()?;

        Ok(Pagination { prev, next })
    }

    /// Point every prev link at `prev` and every next link at `next`.
    ///
    /// A direction is left alone when its desired value is `None`, when the
    /// page has no link in that direction, or when every such link already
    /// targets the desired value. If nothing needs changing the input is
    /// returned borrowed.
    pub fn rewrite<'a>(
        &self,
        markup: &'a [u8],
        prev: Option<&str>,
        next: Option<&str>,
    ) -> Result<Cow<'a, [u8]>, RewritingError> {
        let current = self.extract(markup)?;
        let prev = prev.filter(|want| needs_retarget(&current.prev, want));
        let next = next.filter(|want| needs_retarget(&current.next, want));

        let mut handlers = Vec::new();
        if let Some(url) = prev {
            handlers.push(element!(self.prev.as_str(), move |el| {
                if el.has_attribute("href") {
                    el.set_attribute("href", url)?;
                }
                Ok(())
            }));
        }
        if let Some(url) = next {
            handlers.push(element!(self.next.as_str(), move |el| {
                if el.has_attribute("href") {
                    el.set_attribute("href", url)?;
                }
                Ok(())
            }));
        }
        if handlers.is_empty() {
            return Ok(Cow::Borrowed(markup));
        }

        let mut output = Vec::with_capacity(markup.len());
        let mut rewriter = HtmlRewriter::new(
            Settings {
                element_content_handlers: handlers,
                ..Settings::default()
            },
            |chunk: &[u8]| output.extend_from_slice(chunk),
        );
        rewriter.write(markup)?;
        rewriter.end()?;

        Ok(Cow::Owned(output))
    }
}

fn needs_retarget(links: &[String], want: &str) -> bool {
    !links.is_empty() && links.iter().any(|href| href != want)
}

// ---------------------------------------------------------------------------
// Key / URL normalisation
// ---------------------------------------------------------------------------

/// Public URL for a storage key.
pub fn key_to_url(key: &str) -> Result<String, SyncError> {
    let key = key.strip_prefix('/').unwrap_or(key);
    if key.is_empty() {
        return Err(SyncError::InvalidArgument(
            "cannot build a URL from an empty key".to_string(),
        ));
    }

    let dir = if key == DIRECTORY_INDEX {
        Some("")
    } else {
        key.strip_suffix(DIRECTORY_INDEX)
            .filter(|dir| dir.ends_with('/'))
    };
    let url = match dir {
        Some(dir) => format!("/{dir}"),
        None if key.ends_with('/') || has_extension(key) => format!("/{key}"),
        None => format!("/{key}/"),
    };
    Ok(url)
}

/// Storage key for a URL, or `None` when the URL carries no path.
///
/// Query strings, fragments and a leading `scheme://host` are dropped.
pub fn url_to_key(url: &str) -> Option<String> {
    let url = url.split(['?', '#']).next().unwrap_or_default().trim();
    let path = match url.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("/", |i| &rest[i..]),
        None => url,
    };
    if path.is_empty() {
        return None;
    }

    let path = path.strip_prefix('/').unwrap_or(path);
    if path.is_empty() || path.ends_with('/') {
        return Some(format!("{path}{DIRECTORY_INDEX}"));
    }
    if has_extension(path) {
        return Some(path.to_string());
    }
    Some(format!("{path}/{DIRECTORY_INDEX}"))
}

/// Canonical URL of a day's page.
pub fn day_url(day: DayKey) -> String {
    format!("/{day}/")
}

/// Canonical storage key of a day's page.
pub fn day_page_key(day: DayKey) -> String {
    format!("{day}/{DIRECTORY_INDEX}")
}

fn has_extension(path: &str) -> bool {
    let last = path.rsplit('/').next().unwrap_or(path);
    matches!(last.rfind('.'), Some(i) if i > 0 && i + 1 < last.len())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
