//! Cookie parsing and encoding.
//!
//! # Responsibilities
//! - Parse a `Cookie` header into a name-keyed jar, scoped by path
//! - Encode outbound cookies into `Set-Cookie` lines
//!
//! # Design Decisions
//! - Attribute tokens (`Path`, `Domain`, ...) apply to the cookie that
//!   precedes them, matching the legacy `$Path` convention
//! - A cookie with a declared path is retained only when that path is a
//!   prefix of the request path; no declared path means "applies everywhere"
//! - `Set-Cookie` values are never comma-merged; each cookie is one header
//!   line

use std::fmt;

/// `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }

    fn parse(value: &str) -> Option<SameSite> {
        match value.to_ascii_lowercase().as_str() {
            "strict" => Some(SameSite::Strict),
            "lax" => Some(SameSite::Lax),
            "none" => Some(SameSite::None),
            _ => None,
        }
    }
}

/// A single HTTP cookie with its attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    name: String,
    value: String,
    path: Option<String>,
    domain: Option<String>,
    max_age: Option<i64>,
    expires: Option<String>,
    secure: bool,
    http_only: bool,
    same_site: Option<SameSite>,
}

impl Cookie {
    /// Create a cookie with just a name and value.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Cookie {
        Cookie {
            name: name.into(),
            value: value.into(),
            path: None,
            domain: None,
            max_age: None,
            expires: None,
            secure: false,
            http_only: false,
            same_site: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn max_age(&self) -> Option<i64> {
        self.max_age
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    pub fn is_http_only(&self) -> bool {
        self.http_only
    }

    pub fn same_site(&self) -> Option<SameSite> {
        self.same_site
    }

    /// Set the `Path` attribute.
    pub fn with_path(mut self, path: impl Into<String>) -> Cookie {
        self.path = Some(path.into());
        self
    }

    /// Set the `Domain` attribute.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Cookie {
        self.domain = Some(domain.into());
        self
    }

    /// Set the `Max-Age` attribute in seconds.
    pub fn with_max_age(mut self, seconds: i64) -> Cookie {
        self.max_age = Some(seconds);
        self
    }

    /// Set the `Expires` attribute (preformatted HTTP date).
    pub fn with_expires(mut self, date: impl Into<String>) -> Cookie {
        self.expires = Some(date.into());
        self
    }

    /// Mark the cookie `Secure`.
    pub fn secure(mut self, secure: bool) -> Cookie {
        self.secure = secure;
        self
    }

    /// Mark the cookie `HttpOnly`.
    pub fn http_only(mut self, http_only: bool) -> Cookie {
        self.http_only = http_only;
        self
    }

    /// Set the `SameSite` attribute.
    pub fn with_same_site(mut self, same_site: SameSite) -> Cookie {
        self.same_site = Some(same_site);
        self
    }

    /// Render one `Set-Cookie` header value.
    pub fn encode(&self) -> String {
        let mut out = format!("{}={}", self.name, self.value);
        if let Some(path) = &self.path {
            out.push_str("; Path=");
            out.push_str(path);
        }
        if let Some(domain) = &self.domain {
            out.push_str("; Domain=");
            out.push_str(domain);
        }
        if let Some(max_age) = self.max_age {
            out.push_str("; Max-Age=");
            out.push_str(&max_age.to_string());
        }
        if let Some(expires) = &self.expires {
            out.push_str("; Expires=");
            out.push_str(expires);
        }
        if self.secure {
            out.push_str("; Secure");
        }
        if self.http_only {
            out.push_str("; HttpOnly");
        }
        if let Some(same_site) = self.same_site {
            out.push_str("; SameSite=");
            out.push_str(same_site.as_str());
        }
        out
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// Read-only set of cookies decoded from a `Cookie` header, filtered to
/// those applicable to the request path. Later cookies win on name
/// collision.
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    cookies: Vec<Cookie>,
}

impl CookieJar {
    /// Decode a `Cookie` header value against a request path.
    pub fn decode(header_value: &str, request_path: &str) -> CookieJar {
        let mut parsed: Vec<Cookie> = Vec::new();
        for token in header_value.split(';') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            let (name, value) = match token.split_once('=') {
                Some((n, v)) => (n.trim(), v.trim().trim_matches('"')),
                None => (token, ""),
            };
            if apply_attribute(&mut parsed, name, value) {
                continue;
            }
            parsed.push(Cookie::new(name, value));
        }

        let cookies = parsed
            .into_iter()
            .filter(|c| match c.path() {
                Some(path) => request_path.starts_with(path),
                None => true,
            })
            .collect();
        CookieJar { cookies }
    }

    /// Look up a cookie by name. The last applicable cookie wins.
    pub fn get(&self, name: &str) -> Option<&Cookie> {
        self.cookies.iter().rev().find(|c| c.name() == name)
    }

    /// The value of a named cookie, if present.
    pub fn get_value(&self, name: &str) -> Option<&str> {
        self.get(name).map(Cookie::value)
    }

    /// All cookies in header order.
    pub fn iter(&self) -> impl Iterator<Item = &Cookie> {
        self.cookies.iter()
    }

    /// Distinct cookie names in header order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cookies.iter().map(Cookie::name)
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

/// Apply an attribute token to the preceding cookie. Returns false when
/// the token is not a known attribute (i.e. it is a cookie of its own).
fn apply_attribute(parsed: &mut [Cookie], name: &str, value: &str) -> bool {
    let attr = name.trim_start_matches('$').to_ascii_lowercase();
    let Some(last) = parsed.last_mut() else {
        return false;
    };
    match attr.as_str() {
        "path" => last.path = Some(value.to_string()),
        "domain" => last.domain = Some(value.to_string()),
        "max-age" => last.max_age = value.parse().ok(),
        "expires" => last.expires = Some(value.to_string()),
        "secure" => last.secure = true,
        "httponly" => last.http_only = true,
        "samesite" => last.same_site = SameSite::parse(value),
        _ => return false,
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_simple_pairs() {
        let jar = CookieJar::decode("session=abc123; theme=dark", "/");
        assert_eq!(jar.len(), 2);
        assert_eq!(jar.get_value("session"), Some("abc123"));
        assert_eq!(jar.get_value("theme"), Some("dark"));
    }

    #[test]
    fn decode_filters_by_path() {
        let jar = CookieJar::decode("a=1; $Path=/admin; b=2", "/public/page");
        assert!(jar.get("a").is_none());
        assert_eq!(jar.get_value("b"), Some("2"));

        let jar = CookieJar::decode("a=1; $Path=/admin; b=2", "/admin/page");
        assert_eq!(jar.get_value("a"), Some("1"));
    }

    #[test]
    fn decode_preserves_name_value_exactly() {
        let jar = CookieJar::decode("k=v%20escaped; plain=x", "/");
        assert_eq!(jar.get_value("k"), Some("v%20escaped"));
        let encoded = jar.get("k").unwrap().encode();
        assert_eq!(encoded, "k=v%20escaped");
    }

    #[test]
    fn encode_full_attribute_set() {
        let cookie = Cookie::new("sid", "42")
            .with_path("/")
            .with_domain("example.com")
            .with_max_age(3600)
            .secure(true)
            .http_only(true)
            .with_same_site(SameSite::Lax);
        assert_eq!(
            cookie.encode(),
            "sid=42; Path=/; Domain=example.com; Max-Age=3600; Secure; HttpOnly; SameSite=Lax"
        );
    }

    #[test]
    fn last_cookie_wins_on_duplicate_name() {
        let jar = CookieJar::decode("dup=first; dup=second", "/");
        assert_eq!(jar.get_value("dup"), Some("second"));
        assert_eq!(jar.len(), 2);
    }
}
