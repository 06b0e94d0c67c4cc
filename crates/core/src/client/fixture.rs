use crate::client::SellingClient;
use crate::domain::error::SellingError;
use crate::mapper::Operation;
use anyhow::Context;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ErrorFixture {
    code: String,
    #[serde(default)]
    message: String,
}

/// Answers each operation from `<Operation>.json` in a directory, or fails it
/// with the vendor error in `<Operation>.error.json`. A request carrying a
/// `NextToken` is answered from `<Operation>.<NextToken>.json` when that page
/// exists. Sent payloads are kept for inspection.
#[derive(Debug)]
pub struct FixtureClient {
    dir: PathBuf,
    sent: Mutex<Vec<(Operation, Value)>>,
}

impl FixtureClient {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub async fn sent(&self) -> Vec<(Operation, Value)> {
        self.sent.lock().await.clone()
    }

    async fn read_json(path: &Path) -> anyhow::Result<Option<Value>> {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => {
                let value = serde_json::from_str(&text)
                    .with_context(|| format!("failed to parse fixture {}", path.display()))?;
                Ok(Some(value))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => {
                Err(err).with_context(|| format!("failed to read fixture {}", path.display()))
            }
        }
    }
}

#[async_trait::async_trait]
impl SellingClient for FixtureClient {
    async fn send(&self, operation: Operation, payload: Value) -> anyhow::Result<Value> {
        let page = payload
            .get("NextToken")
            .and_then(Value::as_str)
            .filter(|t| is_page_name(t))
            .map(str::to_string);
        self.sent.lock().await.push((operation, payload));

        let error_path = self.dir.join(format!("{operation}.error.json"));
        if let Some(raw) = Self::read_json(&error_path).await? {
            let fixture: ErrorFixture = serde_json::from_value(raw)
                .with_context(|| format!("invalid error fixture {}", error_path.display()))?;
            tracing::warn!(%operation, code = %fixture.code, "fixture answered with error");
            return Err(SellingError::remote(operation.as_str(), &fixture.code, fixture.message).into());
        }

        if let Some(page) = page {
            let path = self.dir.join(format!("{operation}.{page}.json"));
            if let Some(response) = Self::read_json(&path).await? {
                tracing::info!(%operation, fixture = %path.display(), "fixture page");
                return Ok(response);
            }
        }

        let path = self.dir.join(format!("{operation}.json"));
        let response = Self::read_json(&path)
            .await?
            .with_context(|| format!("no fixture for {operation} in {}", self.dir.display()))?;
        tracing::info!(%operation, fixture = %path.display(), "fixture response");
        Ok(response)
    }
}

fn is_page_name(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
