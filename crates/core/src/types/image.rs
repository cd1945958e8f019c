//! Product image reference resolution.
//!
//! Image paths coming from the backend are either absolute URLs or paths
//! relative to the API host. [`ImageResolver`] turns both into something a
//! client can fetch, falling back to a placeholder when no image exists.

/// Placeholder image served by the frontends when a product has no image.
pub const DEFAULT_PLACEHOLDER_IMAGE: &str = "/placeholder-product.png";

/// A resolved product image reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageRef {
    /// Fully qualified image URL.
    Url(String),
    /// No image. [`ImageResolver::url_for`] renders the configured placeholder.
    Placeholder,
}

impl ImageRef {
    /// Whether this reference stands in for a missing image.
    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }
}

/// Resolves backend image paths against a base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageResolver {
    base_url: String,
    placeholder: String,
}

impl ImageResolver {
    /// Create a resolver for the given API base URL.
    ///
    /// Trailing slashes on `base_url` are dropped so joins never produce `//`.
    #[must_use]
    pub fn new(base_url: &str, placeholder: impl Into<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            placeholder: placeholder.into(),
        }
    }

    /// Base URL relative paths are joined with.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve an optional image path.
    #[must_use]
    pub fn resolve(&self, path: Option<&str>) -> ImageRef {
        match path.map(str::trim) {
            None | Some("") => ImageRef::Placeholder,
            Some(path) if path.starts_with("http") => ImageRef::Url(path.to_owned()),
            Some(path) if path.starts_with('/') => {
                ImageRef::Url(format!("{}{path}", self.base_url))
            }
            Some(path) => ImageRef::Url(format!("{}/{path}", self.base_url)),
        }
    }

    /// Resolve an optional image path to a displayable string.
    ///
    /// Placeholders become the configured placeholder path.
    #[must_use]
    pub fn url_for(&self, path: Option<&str>) -> String {
        match self.resolve(path) {
            ImageRef::Url(url) => url,
            ImageRef::Placeholder => self.placeholder.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> ImageResolver {
        ImageResolver::new("http://localhost:8000/", DEFAULT_PLACEHOLDER_IMAGE)
    }

    #[test]
    fn test_absent_path_is_placeholder() {
        assert_eq!(resolver().resolve(None), ImageRef::Placeholder);
        assert_eq!(resolver().resolve(Some("")), ImageRef::Placeholder);
        assert_eq!(resolver().url_for(None), "/placeholder-product.png");
    }

    #[test]
    fn test_absolute_url_passes_through() {
        let url = "https://cdn.example.com/img/p1.jpg";
        assert_eq!(resolver().resolve(Some(url)), ImageRef::Url(url.to_string()));
    }

    #[test]
    fn test_relative_path_joined_with_base() {
        assert_eq!(
            resolver().url_for(Some("/static/products/p1.jpg")),
            "http://localhost:8000/static/products/p1.jpg"
        );
        assert_eq!(
            resolver().url_for(Some("static/products/p1.jpg")),
            "http://localhost:8000/static/products/p1.jpg"
        );
    }

    #[test]
    fn test_custom_placeholder() {
        let resolver = ImageResolver::new("http://api.local", "/img/none.svg");
        assert_eq!(resolver.url_for(Some("  ")), "/img/none.svg");
        assert_eq!(resolver.base_url(), "http://api.local");
    }

    #[test]
    fn test_placeholder_rendered_by_resolver_only() {
        let resolver = ImageResolver::new("http://api.local", "/img/none.svg");
        assert!(resolver.resolve(None).is_placeholder());
        assert_eq!(resolver.url_for(None), "/img/none.svg");
    }
}
