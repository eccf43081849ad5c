//! URL builders for the cat API endpoints.
//!
//! Builders only encode what they are given. Font sizes, colors and filter
//! names are not checked here; the API rejects bad values with a status code
//! that the fetch layer reports back.

use crate::config::DEFAULT_CATAAS_BASE_URL;

/// URL builder bound to one API base
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatUrls {
    base: String,
}

impl Default for CatUrls {
    fn default() -> Self {
        Self::new(DEFAULT_CATAAS_BASE_URL)
    }
}

impl CatUrls {
    /// Create a builder for `base` (a trailing slash is ignored)
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        let base: String = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    /// Random cat, optionally filtered by tag(s)
    ///
    /// ```
    /// use cataas_bot::cataas::CatUrls;
    ///
    /// let urls = CatUrls::new("https://cataas.com");
    /// assert_eq!(urls.cat(None), "https://cataas.com/cat");
    /// assert_eq!(urls.cat(Some("cute,orange")), "https://cataas.com/cat/cute%2Corange");
    /// ```
    #[must_use]
    pub fn cat(&self, tag: Option<&str>) -> String {
        match tag {
            Some(tag) => format!("{}/cat/{}", self.base, encode_tag(tag)),
            None => format!("{}/cat", self.base),
        }
    }

    /// Random animated cat
    #[must_use]
    pub fn cat_gif(&self) -> String {
        format!("{}/cat/gif", self.base)
    }

    /// Random cat with a caption
    #[must_use]
    pub fn cat_says(
        &self,
        text: &str,
        tag: Option<&str>,
        font_size: Option<i64>,
        font_color: Option<&str>,
    ) -> String {
        let text = urlencoding::encode(text);
        let path = match tag {
            Some(tag) => format!("{}/cat/{}/says/{text}", self.base, encode_tag(tag)),
            None => format!("{}/cat/says/{text}", self.base),
        };
        with_query(path, font_size, font_color, None)
    }

    /// Random animated cat with a caption
    #[must_use]
    pub fn cat_gif_says(
        &self,
        text: &str,
        font_size: Option<i64>,
        font_color: Option<&str>,
        filter: Option<&str>,
    ) -> String {
        let path = format!("{}/cat/gif/says/{}", self.base, urlencoding::encode(text));
        with_query(path, font_size, font_color, filter)
    }

    /// JSON list of every tag known upstream
    #[must_use]
    pub fn tags(&self) -> String {
        format!("{}/api/tags", self.base)
    }
}

/// Encode a tag path segment.
///
/// Commas separate multiple tags. They are handed to the encoder as-is, so a
/// list like `cute,orange` travels as `cute%2Corange`.
fn encode_tag(tag: &str) -> String {
    urlencoding::encode(tag).into_owned()
}

fn with_query(
    path: String,
    font_size: Option<i64>,
    font_color: Option<&str>,
    filter: Option<&str>,
) -> String {
    let mut params = Vec::new();

    if let Some(size) = font_size {
        params.push(format!("fontSize={size}"));
    }
    if let Some(color) = font_color {
        params.push(format!("fontColor={}", urlencoding::encode(color)));
    }
    if let Some(filter) = filter {
        params.push(format!("filter={}", urlencoding::encode(filter)));
    }

    if params.is_empty() {
        path
    } else {
        format!("{path}?{}", params.join("&"))
    }
}
