//! Session-scoped credentials and saved identifiers, passed explicitly to
//! every call site instead of living in process-wide state.

use crate::domain::error::{FieldError, SellingError};
use crate::domain::form::FormState;
use serde::Serialize;
use std::fmt;

pub const DEFAULT_REGION: &str = "us-east-1";

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
    pub session_token: Option<String>,
    /// `None` until the file or the environment names one; see [`Credentials::region`].
    pub region: Option<String>,
    pub catalog: Option<String>,
    pub endpoint_url: Option<String>,
}

impl Credentials {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            ..Default::default()
        }
    }

    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_REGION)
    }

    pub fn redacted(&self) -> RedactedCredentials {
        RedactedCredentials {
            access_key: mask(&self.access_key),
            has_session_token: self.session_token.is_some(),
            region: self.region().to_string(),
            catalog: self.catalog.clone(),
            endpoint_url: self.endpoint_url.clone(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &mask(&self.access_key))
            .field("secret_key", &"***")
            .field("session_token", &self.session_token.as_ref().map(|_| "***"))
            .field("region", &self.region())
            .field("catalog", &self.catalog)
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}

/// Display-safe view of the signed-in credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RedactedCredentials {
    pub access_key: String,
    pub has_session_token: bool,
    pub region: String,
    pub catalog: Option<String>,
    pub endpoint_url: Option<String>,
}

// Keeps the last four characters, like the AWS console does.
fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        return "***".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("***{tail}")
}

/// Parses a `key=value` credentials file. Profile headers, comments and
/// unknown keys are ignored; the value is everything after the first `=`.
/// Missing keys are left empty; [`SessionContext::sign_in`] rejects them.
pub fn parse_credentials_file(text: &str) -> Credentials {
    let mut creds = Credentials::default();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match key.trim() {
            "aws_access_key_id" => creds.access_key = value.to_string(),
            "aws_secret_access_key" => creds.secret_key = value.to_string(),
            "aws_session_token" => creds.session_token = Some(value.to_string()),
            "region" => creds.region = Some(value.to_string()),
            "catalog" => creds.catalog = Some(value.to_string()),
            "endpoint_url" => creds.endpoint_url = Some(value.to_string()),
            _ => {}
        }
    }

    creds
}

/// Explicit replacement for browser session storage: created on sign-in,
/// cleared on sign-out. Last write wins.
#[derive(Debug, Default)]
pub struct SessionContext {
    credentials: Option<Credentials>,
    opportunity_id: Option<String>,
    engagement_invitation_id: Option<String>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_in(&mut self, credentials: Credentials) -> Result<(), SellingError> {
        let mut errors = Vec::new();
        if credentials.access_key.trim().is_empty() {
            errors.push(FieldError::new("AccessKey", "Access Key is required"));
        }
        if credentials.secret_key.trim().is_empty() {
            errors.push(FieldError::new("SecretKey", "Secret Key is required"));
        }
        if !errors.is_empty() {
            return Err(SellingError::LocalValidation(errors));
        }

        tracing::info!(
            region = credentials.region(),
            catalog = ?credentials.catalog,
            "signed in"
        );
        self.credentials = Some(credentials);
        Ok(())
    }

    pub fn sign_out(&mut self) {
        if self.credentials.is_some() {
            tracing::info!("signed out");
        }
        *self = Self::default();
    }

    pub fn is_signed_in(&self) -> bool {
        self.credentials.is_some()
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn save_opportunity_id(&mut self, id: impl Into<String>) {
        self.opportunity_id = Some(id.into());
    }

    pub fn opportunity_id(&self) -> Option<&str> {
        self.opportunity_id.as_deref()
    }

    pub fn save_engagement_invitation_id(&mut self, id: impl Into<String>) {
        self.engagement_invitation_id = Some(id.into());
    }

    pub fn engagement_invitation_id(&self) -> Option<&str> {
        self.engagement_invitation_id.as_deref()
    }

    /// Fills `Catalog` from the signed-in credentials when the form has none.
    pub fn seed_form(&self, form: &mut FormState) {
        if let Some(catalog) = self.credentials.as_ref().and_then(|c| c.catalog.as_deref()) {
            form.seed_text("Catalog", catalog);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILE: &str = "[default]\n\
        aws_access_key_id=AKIAEXAMPLE1234\n\
        aws_secret_access_key = wJalr/K7MDENG+bPxRfi==\n\
        aws_session_token=FwoGZXIvYXdzEXAMPLE\n\
        # comment\n\
        output=json\n";

    #[test]
    fn parses_standard_keys_and_defaults_region() {
        let creds = parse_credentials_file(FILE);
        assert_eq!(creds.access_key, "AKIAEXAMPLE1234");
        assert_eq!(creds.secret_key, "wJalr/K7MDENG+bPxRfi==");
        assert_eq!(creds.session_token.as_deref(), Some("FwoGZXIvYXdzEXAMPLE"));
        assert_eq!(creds.region, None);
        assert_eq!(creds.region(), "us-east-1");
        assert_eq!(creds.catalog, None);
    }

    #[test]
    fn reads_region_and_catalog() {
        let creds = parse_credentials_file(
            "aws_access_key_id=A\naws_secret_access_key=B\nregion=eu-west-1\ncatalog=Sandbox\n",
        );
        assert_eq!(creds.region(), "eu-west-1");
        assert_eq!(creds.catalog.as_deref(), Some("Sandbox"));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let creds = parse_credentials_file(FILE);
        let printed = format!("{creds:?}");
        assert!(!printed.contains("wJalr"));
        assert!(!printed.contains("FwoGZXIv"));
        assert!(!printed.contains("AKIAEXAMPLE"));
        assert!(printed.contains("***1234"));
        assert_eq!(creds.redacted().access_key, "***1234");
    }

    #[test]
    fn sign_in_requires_both_keys() {
        let mut session = SessionContext::new();
        let err = session.sign_in(Credentials::new("", " ")).unwrap_err();
        let fields: Vec<_> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["AccessKey", "SecretKey"]);
        assert!(!session.is_signed_in());
    }

    #[test]
    fn sign_out_clears_everything() {
        let mut session = SessionContext::new();
        session.sign_in(Credentials::new("A", "B")).unwrap();
        session.save_opportunity_id("O1");
        session.save_opportunity_id("O2");
        session.save_engagement_invitation_id("ei-1");
        assert_eq!(session.opportunity_id(), Some("O2"));

        session.sign_out();
        assert!(session.credentials().is_none());
        assert_eq!(session.opportunity_id(), None);
        assert_eq!(session.engagement_invitation_id(), None);
    }

    #[test]
    fn seed_form_fills_missing_catalog_only() {
        let mut session = SessionContext::new();
        let mut creds = Credentials::new("A", "B");
        creds.catalog = Some("Sandbox".to_string());
        session.sign_in(creds).unwrap();

        let mut empty = FormState::new();
        session.seed_form(&mut empty);
        assert_eq!(empty.text("Catalog").as_deref(), Some("Sandbox"));

        let mut explicit = FormState::new().with_text("Catalog", "AWS");
        session.seed_form(&mut explicit);
        assert_eq!(explicit.text("Catalog").as_deref(), Some("AWS"));
    }
}
