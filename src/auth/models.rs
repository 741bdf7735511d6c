/// The caller behind a verified access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedAccount {
    /// Id of the account the token was issued to.
    pub account_id: i64,
}

/// Credential presented by the payment provider's webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKey(pub String);

impl ApiKey {
    /// Compare against the configured key. An empty configured key matches nothing.
    pub fn matches(&self, expected: &str) -> bool {
        !expected.is_empty() && self.0 == expected
    }
}
