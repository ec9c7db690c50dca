use secrecy::SecretString;

/// Connection settings for an AAP controller.
#[derive(Debug)]
pub struct AapConfig {
    /// Controller root, e.g. `https://aap.example.com`. Trailing slashes are trimmed.
    pub base_url: String,
    pub verify_ssl: bool,
    pub token: SecretString,
}

impl AapConfig {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            verify_ssl: true,
            token: SecretString::from(token.into()),
        }
    }

    pub fn with_verify_ssl(mut self, verify_ssl: bool) -> Self {
        self.verify_ssl = verify_ssl;
        self
    }
}
