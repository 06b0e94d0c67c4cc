pub mod client;
pub mod domain;
pub mod mapper;
pub mod session;

pub mod config {
    use crate::session::{parse_credentials_file, Credentials};
    use anyhow::Context;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub catalog: Option<String>,
        pub region: Option<String>,
        pub endpoint_url: Option<String>,
        pub credentials_file: Option<String>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                catalog: non_empty_var("SELLING_CATALOG"),
                region: non_empty_var("AWS_REGION"),
                endpoint_url: non_empty_var("SELLING_ENDPOINT_URL"),
                credentials_file: non_empty_var("SELLING_CREDENTIALS_FILE"),
                sentry_dsn: non_empty_var("SENTRY_DSN"),
            })
        }

        pub fn require_catalog(&self) -> anyhow::Result<&str> {
            self.catalog
                .as_deref()
                .context("SELLING_CATALOG is required (e.g. AWS or Sandbox)")
        }

        pub fn require_credentials_file(&self) -> anyhow::Result<&str> {
            self.credentials_file
                .as_deref()
                .context("SELLING_CREDENTIALS_FILE is required")
        }

        /// Reads the credentials file; values missing from the file fall back
        /// to `AWS_REGION`, `SELLING_CATALOG` and `SELLING_ENDPOINT_URL`.
        pub async fn load_credentials(&self, path: Option<&str>) -> anyhow::Result<Credentials> {
            let path = match path {
                Some(p) => p,
                None => self.require_credentials_file()?,
            };
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read credentials file {path}"))?;
            Ok(self.apply_defaults(parse_credentials_file(&text)))
        }

        pub fn apply_defaults(&self, mut creds: Credentials) -> Credentials {
            if creds.region.is_none() {
                creds.region = self.region.clone();
            }
            if creds.catalog.is_none() {
                creds.catalog = self.catalog.clone();
            }
            if creds.endpoint_url.is_none() {
                creds.endpoint_url = self.endpoint_url.clone();
            }
            creds
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.trim().is_empty())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn settings() -> Settings {
            Settings {
                catalog: Some("Sandbox".to_string()),
                region: Some("eu-west-1".to_string()),
                endpoint_url: None,
                credentials_file: None,
                sentry_dsn: None,
            }
        }

        #[test]
        fn file_values_win_over_settings() {
            let creds = parse_credentials_file(
                "aws_access_key_id=A\naws_secret_access_key=B\nregion=ap-south-1\ncatalog=AWS\n",
            );
            let creds = settings().apply_defaults(creds);
            assert_eq!(creds.region(), "ap-south-1");
            assert_eq!(creds.catalog.as_deref(), Some("AWS"));
        }

        #[test]
        fn settings_fill_missing_values() {
            let creds = settings().apply_defaults(Credentials::new("A", "B"));
            assert_eq!(creds.region(), "eu-west-1");
            assert_eq!(creds.catalog.as_deref(), Some("Sandbox"));
        }

        #[test]
        fn explicit_default_region_is_kept() {
            let creds = parse_credentials_file(
                "aws_access_key_id=A\naws_secret_access_key=B\nregion=us-east-1\n",
            );
            let creds = settings().apply_defaults(creds);
            assert_eq!(creds.region.as_deref(), Some("us-east-1"));
        }

        #[test]
        fn region_defaults_when_neither_file_nor_env_sets_it() {
            let mut settings = settings();
            settings.region = None;
            let creds = settings.apply_defaults(Credentials::new("A", "B"));
            assert_eq!(creds.region, None);
            assert_eq!(creds.region(), "us-east-1");
        }

        #[tokio::test]
        async fn missing_file_has_context() {
            let err = settings()
                .load_credentials(Some("/nonexistent/selling-credentials"))
                .await
                .unwrap_err();
            assert!(err.to_string().contains("failed to read credentials file"));
        }

        #[test]
        fn require_credentials_file_names_the_variable() {
            let err = settings().require_credentials_file().unwrap_err();
            assert!(err.to_string().contains("SELLING_CREDENTIALS_FILE"));
        }
    }
}
