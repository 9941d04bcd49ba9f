//! Credential extraction
//!
//! Picks the candidate token out of the raw values the HTTP layer hands us.
//! Reading headers and parsing cookies happens outside this crate.

/// Name of the cookie the HTTP layer should read the token from
pub const TOKEN_COOKIE: &str = "token";

/// Authorization scheme accepted in the `Authorization` header
pub const BEARER_SCHEME: &str = "Bearer";

/// Raw credential inputs of one request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Credentials<'a> {
    /// Raw `Authorization` header value
    pub authorization: Option<&'a str>,
    /// Raw value of the [`TOKEN_COOKIE`] cookie
    pub cookie: Option<&'a str>,
}

impl<'a> Credentials<'a> {
    /// Bundle the two raw inputs
    pub fn new(authorization: Option<&'a str>, cookie: Option<&'a str>) -> Self {
        Self {
            authorization,
            cookie,
        }
    }

    /// Candidate token, see [`extract_token`]
    pub fn token(&self) -> Option<&'a str> {
        extract_token(self.authorization, self.cookie)
    }
}

/// Select the candidate token from an authorization header and a cookie
///
/// A present header always wins, even when its scheme is not `Bearer`: in
/// that case nothing is extracted and the cookie is ignored. The token runs
/// from the first space to the next one, so trailing text is dropped. Empty
/// strings count as absent.
///
/// ```rust
/// use jwt_checkout::extract_token;
///
/// assert_eq!(extract_token(Some("Bearer abc"), Some("xyz")), Some("abc"));
/// assert_eq!(extract_token(Some("Basic abc"), Some("xyz")), None);
/// assert_eq!(extract_token(None, Some("xyz")), Some("xyz"));
/// ```
pub fn extract_token<'a>(
    authorization: Option<&'a str>,
    cookie: Option<&'a str>,
) -> Option<&'a str> {
    if let Some(header) = authorization.filter(|h| !h.is_empty()) {
        let mut parts = header.split(' ');
        return match (parts.next(), parts.next()) {
            (Some(BEARER_SCHEME), Some(token)) if !token.is_empty() => Some(token),
            _ => None,
        };
    }

    cookie.filter(|c| !c.is_empty())
}
