use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use selling_core::config::Settings;
use selling_core::domain::error::{FieldError, SellingError};
use selling_core::domain::form::FormState;
use selling_core::domain::opportunity::ReviewStatus;
use selling_core::mapper::request::build_request;
use selling_core::mapper::response::{flatten_response, prepare_update, FlattenedResponse};
use selling_core::mapper::summary::merge_secondary_summary;
use selling_core::mapper::token::ClientToken;
use selling_core::mapper::Operation;
use selling_core::session::{parse_credentials_file, RedactedCredentials, SessionContext};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let mut session = SessionContext::new();
    if settings.credentials_file.is_some() {
        match settings.load_credentials(None).await {
            Ok(creds) => {
                if let Err(e) = session.sign_in(creds) {
                    tracing::warn!(error = %e, "credentials file rejected; starting signed out");
                }
            }
            Err(e) => {
                sentry_anyhow::capture_anyhow(&e);
                tracing::error!(error = %e, "credentials file unreadable; starting signed out");
            }
        }
    }

    let state = AppState::new(settings, session);
    let app = router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/payloads/:operation", post(build_payload))
        .route("/responses/:operation/flatten", post(flatten))
        .route("/opportunities/prepare-update", post(prepare_update_payload))
        .route("/opportunities/merge-summary", post(merge_summary))
        .route(
            "/session",
            post(sign_in).get(get_session).delete(sign_out),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    settings: Arc<Settings>,
    session: Arc<RwLock<SessionContext>>,
}

impl AppState {
    fn new(settings: Settings, session: SessionContext) -> Self {
        Self {
            settings: Arc::new(settings),
            session: Arc::new(RwLock::new(session)),
        }
    }
}

/// Maps mapper failures onto HTTP: local validation is 422 with the field
/// errors, vendor schema rejection 400, other vendor failures 502.
struct ApiError {
    status: StatusCode,
    error: anyhow::Error,
}

impl ApiError {
    fn not_found(error: anyhow::Error) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            error,
        }
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let error = err.into();
        let status = match error.downcast_ref::<SellingError>() {
            Some(SellingError::LocalValidation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Some(SellingError::RemoteValidation { .. }) => StatusCode::BAD_REQUEST,
            Some(SellingError::RemoteService { .. }) => StatusCode::BAD_GATEWAY,
            None => StatusCode::BAD_REQUEST,
        };
        Self { status, error }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ErrorBody {
    message: String,
    field_errors: Vec<FieldError>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.error.downcast_ref::<SellingError>() {
            Some(selling) => ErrorBody {
                message: selling.banner(),
                field_errors: selling.field_errors().to_vec(),
            },
            None => ErrorBody {
                message: format!("{:#}", self.error),
                field_errors: Vec::new(),
            },
        };
        if self.status.is_server_error() {
            sentry_anyhow::capture_anyhow(&self.error);
        }
        (self.status, Json(body)).into_response()
    }
}

fn parse_operation(raw: &str) -> Result<Operation, ApiError> {
    raw.parse::<Operation>().map_err(ApiError::not_found)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BuildPayloadBody {
    form: FormState,
    #[serde(default)]
    client_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct BuiltPayload {
    operation: Operation,
    client_token: String,
    payload: Value,
}

async fn build_payload(
    State(state): State<AppState>,
    Path(operation): Path<String>,
    Json(body): Json<BuildPayloadBody>,
) -> Result<Json<BuiltPayload>, ApiError> {
    let operation = parse_operation(&operation)?;

    let mut form = body.form;
    state.session.read().await.seed_form(&mut form);
    if let Some(catalog) = &state.settings.catalog {
        form.seed_text("Catalog", catalog);
    }

    let token = body
        .client_token
        .map(ClientToken::from_existing)
        .unwrap_or_default();
    let payload = build_request(operation, &form, &token)?;

    Ok(Json(BuiltPayload {
        operation,
        client_token: token.as_str().to_string(),
        payload,
    }))
}

async fn flatten(
    Path(operation): Path<String>,
    Json(response): Json<Value>,
) -> Result<Json<FlattenedResponse>, ApiError> {
    let operation = parse_operation(&operation)?;
    Ok(Json(flatten_response(operation, response)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PrepareUpdateBody {
    response: Value,
    #[serde(default)]
    review_status: Option<ReviewStatus>,
}

async fn prepare_update_payload(
    State(state): State<AppState>,
    Json(body): Json<PrepareUpdateBody>,
) -> Json<Value> {
    let update = prepare_update(body.response, body.review_status);
    if let Some(id) = update.get("Identifier").and_then(Value::as_str) {
        state.session.write().await.save_opportunity_id(id);
    }
    Json(update)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MergeSummaryBody {
    primary: Value,
    #[serde(default)]
    secondary: Value,
}

async fn merge_summary(Json(body): Json<MergeSummaryBody>) -> Json<Value> {
    Json(merge_secondary_summary(body.primary, &body.secondary))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SessionView {
    signed_in: bool,
    credentials: Option<RedactedCredentials>,
    opportunity_id: Option<String>,
    engagement_invitation_id: Option<String>,
}

impl SessionView {
    fn of(session: &SessionContext) -> Self {
        Self {
            signed_in: session.is_signed_in(),
            credentials: session.credentials().map(|c| c.redacted()),
            opportunity_id: session.opportunity_id().map(str::to_string),
            engagement_invitation_id: session.engagement_invitation_id().map(str::to_string),
        }
    }
}

/// Body is the credentials file text.
async fn sign_in(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<SessionView>, ApiError> {
    let creds = state.settings.apply_defaults(parse_credentials_file(&body));
    let mut session = state.session.write().await;
    session.sign_in(creds)?;
    Ok(Json(SessionView::of(&session)))
}

async fn get_session(State(state): State<AppState>) -> Json<SessionView> {
    Json(SessionView::of(&*state.session.read().await))
}

async fn sign_out(State(state): State<AppState>) -> StatusCode {
    state.session.write().await.sign_out();
    StatusCode::NO_CONTENT
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state() -> AppState {
        let settings = Settings {
            catalog: None,
            region: None,
            endpoint_url: None,
            credentials_file: None,
            sentry_dsn: None,
        };
        AppState::new(settings, SessionContext::new())
    }

    async fn body_json(resp: Response) -> Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn form(value: Value) -> BuildPayloadBody {
        serde_json::from_value(json!({ "Form": value })).unwrap()
    }

    #[tokio::test]
    async fn invalid_duns_is_unprocessable() {
        let err = build_payload(
            State(state()),
            Path("CreateOpportunity".to_string()),
            Json(form(json!({"Catalog": "Sandbox", "Duns": "12345"}))),
        )
        .await
        .err()
        .unwrap();

        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(resp).await;
        assert_eq!(body["FieldErrors"][0]["Field"], json!("Duns"));
    }

    #[tokio::test]
    async fn signed_in_catalog_seeds_payload() {
        let state = state();
        sign_in(
            State(state.clone()),
            "aws_access_key_id=AKIA1234\naws_secret_access_key=s3cr3t\ncatalog=Sandbox\n".to_string(),
        )
        .await
        .ok()
        .unwrap();

        let Json(built) = build_payload(
            State(state),
            Path("CreateOpportunity".to_string()),
            Json(form(json!({"CustomerUseCase": ["Database"]}))),
        )
        .await
        .ok()
        .unwrap();
        assert_eq!(built.payload["Catalog"], json!("Sandbox"));
        assert_eq!(built.payload["PrimaryNeedsFromAws"], json!([]));
        assert_eq!(built.payload["ClientToken"], json!(built.client_token));
    }

    #[tokio::test]
    async fn unknown_operation_is_not_found() {
        let err = flatten(Path("DeleteOpportunity".to_string()), Json(json!({})))
            .await
            .err()
            .unwrap();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn session_lifecycle_never_exposes_secrets() {
        let state = state();
        let Json(view) = sign_in(
            State(state.clone()),
            "aws_access_key_id=AKIAEXAMPLE9876\naws_secret_access_key=topsecret\n".to_string(),
        )
        .await
        .ok()
        .unwrap();
        let printed = serde_json::to_string(&view).unwrap();
        assert!(!printed.contains("topsecret"));
        assert!(printed.contains("***9876"));

        prepare_update_payload(
            State(state.clone()),
            Json(PrepareUpdateBody {
                response: json!({"Id": "O42", "Catalog": "Sandbox"}),
                review_status: None,
            }),
        )
        .await;
        let Json(view) = get_session(State(state.clone())).await;
        assert_eq!(view.opportunity_id.as_deref(), Some("O42"));

        assert_eq!(sign_out(State(state.clone())).await, StatusCode::NO_CONTENT);
        let Json(view) = get_session(State(state)).await;
        assert!(!view.signed_in);
        assert!(view.opportunity_id.is_none());
    }

    #[tokio::test]
    async fn sign_in_without_keys_is_rejected() {
        let err = sign_in(State(state()), "region=us-west-2\n".to_string())
            .await
            .err()
            .unwrap();
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn merge_with_empty_secondary_defaults_origin() {
        let Json(merged) = merge_summary(Json(MergeSummaryBody {
            primary: json!({"Id": "O1"}),
            secondary: json!({}),
        }))
        .await;
        assert_eq!(merged, json!({"Id": "O1", "Origin": "Partner referral"}));
    }
}
