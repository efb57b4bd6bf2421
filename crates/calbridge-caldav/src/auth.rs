//! HTTP Basic credentials for the upstream server (RFC 7617).

use std::fmt;

use base64::Engine;

/// Username and password sent with every upstream request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Value for the `Authorization` header.
    pub fn authorization_header(&self) -> String {
        let credentials = format!("{}:{}", self.username, self.password);
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
        format!("Basic {}", encoded)
    }
}

// Keeps the password out of logs and panics.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_auth_encoding() {
        let creds = Credentials::new("user", "password");
        // base64("user:password") = "dXNlcjpwYXNzd29yZA=="
        assert_eq!(creds.authorization_header(), "Basic dXNlcjpwYXNzd29yZA==");
    }

    #[test]
    fn debug_redacts_password() {
        let creds = Credentials::new("someone@icloud.com", "abcd-efgh-ijkl-mnop");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("someone@icloud.com"));
        assert!(!debug.contains("abcd-efgh"));
    }
}
