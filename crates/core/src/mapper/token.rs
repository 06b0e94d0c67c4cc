use serde::Serialize;
use uuid::Uuid;

/// Idempotency token for one user action on a form.
///
/// Created once when the form session starts; retries of the same submission
/// reuse it and `next_action` rotates it for the next distinct submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ClientToken(String);

impl ClientToken {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wraps a caller-provided token (e.g. one carried over from a previous attempt).
    pub fn from_existing(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Token for a retry of the same action: unchanged.
    pub fn retry(&self) -> Self {
        self.clone()
    }

    /// Replaces the token after a submission completed.
    pub fn next_action(&mut self) -> &Self {
        *self = Self::generate();
        self
    }
}

impl Default for ClientToken {
    fn default() -> Self {
        Self::generate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_reuses_token() {
        let token = ClientToken::generate();
        assert_eq!(token.retry(), token);
        assert!(Uuid::parse_str(token.as_str()).is_ok());
    }

    #[test]
    fn next_action_rotates_token() {
        let mut token = ClientToken::generate();
        let first = token.clone();
        token.next_action();
        assert_ne!(token, first);
    }
}
