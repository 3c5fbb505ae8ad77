//! Header map and lookup shared by the payload builder and agent.
//!
//! Host runtimes disagree on header-key casing: some hand over lowercased
//! keys, others preserve the canonical `Title-Case` form. Lookups here check
//! both conventions before giving up.

/// Name marker of the CHEQ RTI cookie inside the `Cookie` header.
pub const CHEQ_COOKIE_NAME: &str = "_cheq_rti";

/// Insertion-ordered header map with unique keys.
///
/// Inserting an existing key replaces its value in place (last write wins).
/// Keys are compared exactly; case-insensitive access goes through
/// [`get_header`]. Order is observable on the wire through the payload's
/// `HeaderNames` field, so it must be stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadersMap {
    entries: Vec<(String, String)>,
}

impl HeadersMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a header, replacing the value of an existing exact key.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Returns the value stored under the exact key, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Header names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Name/value pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HeadersMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = HeadersMap::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

/// Looks up a header by name regardless of key casing convention.
///
/// Checks the lowercased name first, then the `Title-Case` variant (first
/// character of each hyphen-delimited segment uppercased). Empty values are
/// treated as absent, so callers chaining fallbacks skip headers a host
/// normalized to `""`.
pub fn get_header<'a>(headers: &'a HeadersMap, name: &str) -> Option<&'a str> {
    headers
        .get(&name.to_lowercase())
        .filter(|v| !v.is_empty())
        .or_else(|| headers.get(&title_case(name)).filter(|v| !v.is_empty()))
}

/// Extracts the CHEQ RTI cookie value from a `Cookie` header.
///
/// Splits on `;`, trims each segment, and takes the remainder of the first
/// segment containing [`CHEQ_COOKIE_NAME`] after the marker and its `=`.
/// Returns `None` when there is no cookie header or no matching segment;
/// absent is distinct from an empty value.
pub fn get_cheq_cookie(cookie: Option<&str>) -> Option<String> {
    let cookie = cookie.filter(|c| !c.is_empty())?;
    cookie
        .split(';')
        .map(str::trim)
        .find(|segment| segment.contains(CHEQ_COOKIE_NAME))
        .map(|segment| {
            let value_start = segment.find(CHEQ_COOKIE_NAME).unwrap_or(0) + CHEQ_COOKIE_NAME.len() + 1;
            segment.get(value_start..).unwrap_or("").to_string()
        })
}

/// Uppercases the first character of each hyphen-delimited segment.
fn title_case(name: &str) -> String {
    name.split('-')
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> HeadersMap {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_insert_replaces_existing_key() {
        let mut map = HeadersMap::new();
        map.insert("host", "a.com");
        map.insert("accept", "*/*");
        map.insert("host", "b.com");

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("host"), Some("b.com"));
        // Replacement keeps the original position.
        assert_eq!(map.names().collect::<Vec<_>>(), vec!["host", "accept"]);
    }

    #[test]
    fn test_names_preserve_insertion_order() {
        let map = headers(&[("user-agent", "ua"), ("accept", "*/*"), ("cookie", "a=1")]);
        let names: Vec<_> = map.names().collect();
        assert_eq!(names, vec!["user-agent", "accept", "cookie"]);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("user-agent"), "User-Agent");
        assert_eq!(title_case("x-cheq-rti-host"), "X-Cheq-Rti-Host");
        assert_eq!(title_case("host"), "Host");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_get_header_lowercase_stored() {
        let map = headers(&[("user-agent", "Mozilla/5.0")]);
        assert_eq!(get_header(&map, "User-Agent"), Some("Mozilla/5.0"));
        assert_eq!(get_header(&map, "user-agent"), Some("Mozilla/5.0"));
    }

    #[test]
    fn test_get_header_title_case_stored() {
        let map = headers(&[("User-Agent", "Mozilla/5.0")]);
        assert_eq!(get_header(&map, "User-Agent"), Some("Mozilla/5.0"));
        assert_eq!(get_header(&map, "user-agent"), Some("Mozilla/5.0"));
    }

    #[test]
    fn test_get_header_missing() {
        let map = headers(&[("accept", "*/*")]);
        assert_eq!(get_header(&map, "Referer"), None);
    }

    #[test]
    fn test_get_header_empty_value_is_absent() {
        let map = headers(&[("x-cheq-rti-host", ""), ("Host", "foo.com")]);
        assert_eq!(get_header(&map, "x-cheq-rti-host"), None);
        assert_eq!(get_header(&map, "Host"), Some("foo.com"));
    }

    #[test]
    fn test_get_header_empty_lowercase_falls_through_to_title_case() {
        let map = headers(&[("host", ""), ("Host", "foo.com")]);
        assert_eq!(get_header(&map, "host"), Some("foo.com"));
    }

    #[test]
    fn test_cheq_cookie_extraction() {
        let value = get_cheq_cookie(Some("a=1; _cheq_rti=XYZ123; b=2"));
        assert_eq!(value, Some("XYZ123".to_string()));
    }

    #[test]
    fn test_cheq_cookie_first_segment() {
        let value = get_cheq_cookie(Some("_cheq_rti=first; _cheq_rti=second"));
        assert_eq!(value, Some("first".to_string()));
    }

    #[test]
    fn test_cheq_cookie_no_match_is_absent() {
        assert_eq!(get_cheq_cookie(Some("a=1; b=2")), None);
    }

    #[test]
    fn test_cheq_cookie_no_header_is_absent() {
        assert_eq!(get_cheq_cookie(None), None);
        assert_eq!(get_cheq_cookie(Some("")), None);
    }

    #[test]
    fn test_cheq_cookie_without_value() {
        // Degenerate segment with no "=": empty value, not a panic.
        assert_eq!(get_cheq_cookie(Some("_cheq_rti")), Some(String::new()));
    }
}
