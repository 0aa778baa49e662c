//! Deterministic cache key construction.

use devportal_crypto::sha256_hex;
use std::collections::BTreeMap;

/// Builder for cache keys of the form
/// `namespace:segment:segment[:k=v&k=v]`.
///
/// Parameters are emitted sorted by name, so equivalent parameter sets
/// always produce the same key regardless of insertion order. The
/// delimiters `:`, `&`, `=` and the escape `%` are percent-encoded inside
/// each component, so distinct components never render the same key.
///
/// ```
/// use devportal_cache::CacheKey;
///
/// let key = CacheKey::new("github")
///     .segment("acme/api")
///     .segment("pulls")
///     .param("state", "open")
///     .param("page", "2")
///     .build();
///
/// assert_eq!(key, "github:acme/api:pulls:page=2&state=open");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    namespace: String,
    segments: Vec<String>,
    params: BTreeMap<String, String>,
}

impl CacheKey {
    /// Start a key in `namespace`
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            segments: Vec::new(),
            params: BTreeMap::new(),
        }
    }

    /// Append a path-like segment
    pub fn segment(mut self, segment: impl ToString) -> Self {
        self.segments.push(segment.to_string());
        self
    }

    /// Append several segments in order
    pub fn segments<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.segments
            .extend(segments.into_iter().map(|s| s.to_string()));
        self
    }

    /// Add a request parameter; a repeated name replaces the earlier value
    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(name.into(), value.to_string());
        self
    }

    /// Add every parameter from a map or iterator of pairs
    pub fn params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        for (name, value) in params {
            self.params.insert(name.into(), value.to_string());
        }
        self
    }

    /// Namespace this key was started with
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Render the key
    pub fn build(&self) -> String {
        let mut key = escape(&self.namespace);

        for segment in &self.segments {
            key.push(':');
            key.push_str(&escape(segment));
        }

        if !self.params.is_empty() {
            let query = self
                .params
                .iter()
                .map(|(name, value)| format!("{}={}", escape(name), escape(value)))
                .collect::<Vec<_>>()
                .join("&");
            key.push(':');
            key.push_str(&query);
        }

        key
    }

    /// Fixed-length form `namespace:hash:<sha256 hex of build()>`
    pub fn hash(&self) -> String {
        format!(
            "{}:hash:{}",
            self.namespace,
            sha256_hex(self.build().as_bytes())
        )
    }
}

fn escape(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    for c in component.chars() {
        match c {
            '%' => out.push_str("%25"),
            ':' => out.push_str("%3A"),
            '&' => out.push_str("%26"),
            '=' => out.push_str("%3D"),
            _ => out.push(c),
        }
    }
    out
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.build())
    }
}
