use anyhow::Context;
use clap::{Parser, Subcommand};
use selling_core::client::{fetch_opportunity, fixture::FixtureClient, list_all, replace_solution};
use selling_core::config::Settings;
use selling_core::domain::error::SellingError;
use selling_core::domain::form::FormState;
use selling_core::domain::opportunity::ReviewStatus;
use selling_core::mapper::request::build_request;
use selling_core::mapper::response::{flatten_response, prepare_update};
use selling_core::mapper::summary::merge_secondary_summary;
use selling_core::mapper::token::ClientToken;
use selling_core::mapper::Operation;
use selling_core::session::SessionContext;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "selling_cli", about = "Partner Central Selling payload mapper")]
struct Args {
    /// Credentials file (key=value lines). Defaults to SELLING_CREDENTIALS_FILE.
    #[arg(long, global = true)]
    credentials: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build the request payload for an operation from a flat form JSON file.
    Build {
        #[arg(long)]
        operation: Operation,
        #[arg(long)]
        form: PathBuf,
        /// Reuse a ClientToken from a previous attempt of the same action.
        #[arg(long)]
        client_token: Option<String>,
    },
    /// Clean a response and print it with its display rows.
    Flatten {
        #[arg(long)]
        operation: Operation,
        #[arg(long)]
        response: PathBuf,
        /// Print only the rows as `path<TAB>value`.
        #[arg(long)]
        rows: bool,
    },
    /// Turn a GetOpportunity response into an UpdateOpportunity payload.
    PrepareUpdate {
        #[arg(long)]
        response: PathBuf,
        #[arg(long)]
        review_status: Option<ReviewStatus>,
    },
    /// Enrich an opportunity with a GetAwsOpportunitySummary response.
    Merge {
        #[arg(long)]
        primary: PathBuf,
        #[arg(long)]
        secondary: PathBuf,
    },
    /// Parse a credentials file and print it with secrets redacted.
    Credentials {
        #[arg(long)]
        file: PathBuf,
    },
    /// Fetch an opportunity (and its AWS summary when approved) from a fixture directory.
    Fetch {
        #[arg(long)]
        fixtures: PathBuf,
        #[arg(long)]
        identifier: String,
        #[arg(long)]
        catalog: Option<String>,
    },
    /// Run a list operation against a fixture directory, following every NextToken.
    List {
        #[arg(long)]
        fixtures: PathBuf,
        #[arg(long)]
        operation: Operation,
        /// Flat form JSON with filters; Catalog falls back to SELLING_CATALOG.
        #[arg(long)]
        form: Option<PathBuf>,
    },
    /// Swap the solution linked to an opportunity in a fixture directory.
    ReplaceSolution {
        #[arg(long)]
        fixtures: PathBuf,
        #[arg(long)]
        identifier: String,
        #[arg(long)]
        old_solution: String,
        #[arg(long)]
        new_solution: String,
        #[arg(long)]
        catalog: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    if let Err(err) = run(args, &settings).await {
        sentry_anyhow::capture_anyhow(&err);
        if let Some(selling) = err.downcast_ref::<SellingError>() {
            tracing::error!(error = %selling, "{}", selling.banner());
            for field_error in selling.field_errors() {
                eprintln!("{}: {}", field_error.field, field_error.message);
            }
        }
        return Err(err);
    }
    Ok(())
}

async fn run(args: Args, settings: &Settings) -> anyhow::Result<()> {
    match args.command {
        Command::Build {
            operation,
            form,
            client_token,
        } => {
            let mut form: FormState = read_json(&form).await?;
            let session = session_for(settings, args.credentials.as_deref()).await?;
            session.seed_form(&mut form);
            if let Some(catalog) = &settings.catalog {
                form.seed_text("Catalog", catalog);
            }

            let token = client_token
                .map(ClientToken::from_existing)
                .unwrap_or_default();
            let payload = build_request(operation, &form, &token)?;
            tracing::info!(%operation, client_token = token.as_str(), "request built");
            print_json(&payload)
        }
        Command::Flatten {
            operation,
            response,
            rows,
        } => {
            let flattened = flatten_response(operation, read_json(&response).await?);
            if rows {
                for row in &flattened.rows {
                    println!("{}\t{}", row.path, row.value);
                }
                Ok(())
            } else {
                print_json(&flattened)
            }
        }
        Command::PrepareUpdate {
            response,
            review_status,
        } => print_json(&prepare_update(read_json(&response).await?, review_status)),
        Command::Merge { primary, secondary } => {
            let primary = read_json(&primary).await?;
            let secondary: serde_json::Value = read_json(&secondary).await?;
            print_json(&merge_secondary_summary(primary, &secondary))
        }
        Command::Credentials { file } => {
            let creds = settings
                .load_credentials(Some(path_str(&file)?))
                .await?;
            let mut session = SessionContext::new();
            session.sign_in(creds.clone())?;
            print_json(&creds.redacted())
        }
        Command::Fetch {
            fixtures,
            identifier,
            catalog,
        } => {
            let catalog = catalog_or_default(catalog, settings)?;
            let client = FixtureClient::new(&fixtures);
            let opportunity = fetch_opportunity(&client, &catalog, &identifier).await?;
            print_json(&opportunity)
        }
        Command::List {
            fixtures,
            operation,
            form,
        } => {
            let mut form: FormState = match form {
                Some(path) => read_json(&path).await?,
                None => FormState::new(),
            };
            if let Some(catalog) = &settings.catalog {
                form.seed_text("Catalog", catalog);
            }
            let client = FixtureClient::new(&fixtures);
            print_json(&list_all(&client, operation, &form).await?)
        }
        Command::ReplaceSolution {
            fixtures,
            identifier,
            old_solution,
            new_solution,
            catalog,
        } => {
            let catalog = catalog_or_default(catalog, settings)?;
            let client = FixtureClient::new(&fixtures);
            let response =
                replace_solution(&client, &catalog, &identifier, &old_solution, &new_solution)
                    .await?;
            print_json(&response)
        }
    }
}

async fn session_for(settings: &Settings, credentials: Option<&Path>) -> anyhow::Result<SessionContext> {
    let mut session = SessionContext::new();
    let path = match credentials {
        Some(p) => Some(path_str(p)?),
        None => settings.credentials_file.as_deref(),
    };
    if let Some(path) = path {
        session.sign_in(settings.load_credentials(Some(path)).await?)?;
    }
    Ok(session)
}

fn catalog_or_default(catalog: Option<String>, settings: &Settings) -> anyhow::Result<String> {
    match catalog {
        Some(c) => Ok(c),
        None => Ok(settings.require_catalog()?.to_string()),
    }
}

fn path_str(path: &Path) -> anyhow::Result<&str> {
    path.to_str()
        .with_context(|| format!("path is not valid UTF-8: {}", path.display()))
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON in {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{text}");
    Ok(())
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
