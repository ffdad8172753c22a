//! Helpers around Mattermost's use of Bearer Authentication with personal
//! access tokens.

use std::fmt;

/// A newtype wrapper around Mattermost access tokens.
#[derive(PartialEq, Eq, Clone)]
pub struct AccessToken(pub String);

impl AccessToken {
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

// Tokens end up in error messages via `{:?}` on the client, so never print
// the secret itself.
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken(..)")
    }
}

/// Convert an access token to a `Bearer` `Authorization` header value.
///
/// ```
/// let token = AccessToken("abc123".into());
/// assert_eq!(to_auth_header_val(&token), "Bearer abc123");
/// ```
pub fn to_auth_header_val(t: &AccessToken) -> String {
    format!("Bearer {}", t.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_auth_header_val() {
        let token = AccessToken("abc123".into());
        assert_eq!(to_auth_header_val(&token), "Bearer abc123");
    }

    #[test]
    fn test_debug_hides_secret() {
        let token = AccessToken("abc123".into());
        assert!(!format!("{:?}", token).contains("abc123"));
    }

    #[test]
    fn test_whitespace_is_empty() {
        assert!(AccessToken(" \n".into()).is_empty());
        assert!(!AccessToken("x".into()).is_empty());
    }
}
