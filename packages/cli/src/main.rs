//! `fedicap`: probe Fediverse servers from the command line.
//!
//! - **`discover`**: run NodeInfo discovery and print what the server runs.
//! - **`check`**: refresh capabilities and print which catalog endpoints are
//!   callable.
//! - **`timeline`**: page through a timeline, older pages first.
//! - **`login`**: save an instance and token to the secret store.
//!
//! Instance and token come from flags, then `FEDICAP_*` environment variables,
//! then the secret store at `--db`.

use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use fedicap::endpoints::{
    AnnouncementsEndpoint, FamiliarFollowersEndpoint, InstanceV2Endpoint, RulesEndpoint,
    StatusEndpoint, StatusesEndpoint, TagEndpoint, TagsEndpoint, TranslationEndpoint,
};
use fedicap::{debug_location, ApiCapabilities, CompatibilityMode, FedicapError, Paging};
use fedicap_api::Status;
use fedicap_client::{
    ApiClient, ClientConfig, ConfigError, DiscoveryClient, HttpTransport, MemorySecretStore,
    SecretStore, SqliteSecretStore, StoreError, Transport,
};
use futures::{pin_mut, StreamExt};
use tracing::info;

/// fedicap: capability-aware Fediverse client
#[derive(Parser)]
#[command(name = "fedicap", version, about, long_about = None)]
struct Cli {
    /// Server base URL. A bare host means https.
    #[arg(long, global = true, env = "FEDICAP_INSTANCE")]
    instance: Option<String>,

    /// Bearer token for authenticated endpoints.
    #[arg(long, global = true, env = "FEDICAP_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// SQLite secret store. Without it nothing is remembered.
    #[arg(long, global = true, env = "FEDICAP_DB")]
    db: Option<String>,

    /// `fallback_on_errors` or `fail_on_errors`.
    #[arg(long, global = true)]
    compatibility_mode: Option<CompatibilityMode>,

    /// On failure, also print the error's diagnostic JSON.
    #[arg(long, global = true)]
    diagnostic: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the server's software, version and derived capabilities.
    Discover,

    /// Print which catalog endpoints this server supports.
    Check,

    /// Page through a timeline.
    ///
    /// Examples:
    ///   fedicap timeline --kind public --limit 5
    ///   fedicap timeline --kind home --max-id 109 --pages 3
    Timeline {
        #[arg(long, value_enum, default_value_t = TimelineKind::Home)]
        kind: TimelineKind,

        /// Hashtag for `--kind tag`, without the `#`.
        #[arg(long)]
        tag: Option<String>,

        /// Cursor from a previous run, replayed verbatim.
        #[arg(long, value_name = "CURSOR")]
        max_id: Option<String>,

        #[arg(long, default_value_t = 20)]
        limit: u32,

        /// Stop after this many pages.
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },

    /// Save the instance and token to the secret store and refresh capabilities.
    Login,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TimelineKind {
    Home,
    Public,
    Local,
    Tag,
    Favourites,
    Bookmarks,
    Bubble,
    Trending,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("could not open secret store: {0}")]
    OpenStore(String),

    #[error(transparent)]
    Api(#[from] FedicapError),

    #[error("{0}")]
    Usage(&'static str),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("FEDICAP_LOG")
                .or_else(|_| tracing_subscriber::EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| "fedicap=info,fedicap_client=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let diagnostic = cli.diagnostic;

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        if let (true, CliError::Api(api_error)) = (diagnostic, &e) {
            eprintln!("{}", api_error.diagnostic_json());
        }
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = ClientConfig::from_env()?;
    if cli.instance.is_some() {
        config.instance_url = cli.instance;
    }
    if cli.token.is_some() {
        config.access_token = cli.token;
    }
    if cli.db.is_some() {
        config.db_path = cli.db;
    }
    if cli.compatibility_mode.is_some() {
        config.compatibility_mode = cli.compatibility_mode;
    }

    let store = open_store(&config)?;
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(config.http_client()?));

    match cli.command {
        Command::Discover => {
            let instance_url = match config.instance_url() {
                Ok(url) => url,
                Err(ConfigError::MissingInstance) => store.instance_url().await?,
                Err(e) => return Err(e.into()),
            };
            let node_info = DiscoveryClient::new(transport)
                .discover(&instance_url, debug_location!())
                .await?;
            let capabilities = ApiCapabilities::from_software(&node_info.software);
            println!("instance:     {instance_url}");
            println!(
                "software:     {} {}",
                node_info.software.name, node_info.software.version
            );
            println!("capabilities: {capabilities}");
            if let Some(users) = node_info.usage.and_then(|u| u.users) {
                if let Some(total) = users.total {
                    println!("users:        {total}");
                }
            }
        }

        Command::Check => {
            let api = connect(&config, store, transport).await?;
            let capabilities = api.refresh_capabilities(debug_location!()).await?;
            println!("{} ({capabilities})", api.instance_url());
            for (name, supported) in support_matrix(&api) {
                println!("  {:<24} {}", name, if supported { "yes" } else { "no" });
            }
        }

        Command::Timeline {
            kind,
            tag,
            max_id,
            limit,
            pages,
        } => {
            let api = connect(&config, store, transport).await?;
            if api.capabilities().flavor.is_none() {
                api.refresh_capabilities(debug_location!()).await?;
            }
            let endpoint = timeline_endpoint(kind, tag)?;
            let paging = Paging {
                max_id,
                ..Paging::with_limit(limit)
            };

            let stream = api.pages(&endpoint, paging, debug_location!());
            pin_mut!(stream);
            let mut remaining = pages;
            while remaining > 0 {
                let Some(page) = stream.next().await else {
                    break;
                };
                let page = page?;
                for status in &page.result {
                    print_status(status);
                }
                match &page.info.max_id {
                    Some(cursor) => println!("-- older: --max-id {cursor}"),
                    None => println!("-- end of timeline"),
                }
                remaining -= 1;
            }
        }

        Command::Login => {
            let instance_url = config.instance_url()?;
            let token = config
                .access_token
                .as_deref()
                .ok_or(CliError::Usage("login needs --token or FEDICAP_TOKEN"))?;
            store.set_instance_url(&instance_url).await?;
            store.set_access_token(Some(token)).await?;
            let api = connect(&config, store, transport).await?;
            let capabilities = api.refresh_capabilities(debug_location!()).await?;
            info!("login: saved session for {instance_url}");
            println!("logged in to {instance_url} ({capabilities})");
        }
    }

    Ok(())
}

fn open_store(config: &ClientConfig) -> Result<Arc<dyn SecretStore>, CliError> {
    match &config.db_path {
        Some(path) => {
            info!("store: SQLite at {path}");
            let store =
                SqliteSecretStore::open(path).map_err(|e| CliError::OpenStore(e.to_string()))?;
            Ok(Arc::new(store))
        }
        None => Ok(Arc::new(MemorySecretStore::new())),
    }
}

/// Build a client from flags, falling back to the secret store.
///
/// Stored capabilities are reused only for the same instance.
async fn connect(
    config: &ClientConfig,
    store: Arc<dyn SecretStore>,
    transport: Arc<dyn Transport>,
) -> Result<ApiClient, CliError> {
    let api = match config.instance_url() {
        Ok(instance_url) => {
            let same_instance = matches!(store.instance_url().await, Ok(stored) if stored == instance_url);
            let (capabilities, stored_token) = if same_instance {
                (store.api_capabilities().await?, store.access_token().await?)
            } else {
                (ApiCapabilities::default(), None)
            };
            let token = config.access_token.clone().or(stored_token);
            ApiClient::new(instance_url, capabilities, token, transport).with_store(store)
        }
        Err(ConfigError::MissingInstance) => {
            let api = ApiClient::from_store(store, transport)
                .await
                .map_err(|e| match e {
                    StoreError::Missing(_) => CliError::Config(ConfigError::MissingInstance),
                    other => other.into(),
                })?;
            if config.access_token.is_some() {
                api.set_access_token(config.access_token.clone());
            }
            api
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(mode) = config.compatibility_mode {
        let capabilities = api.capabilities().as_ref().clone();
        api.set_capabilities(capabilities.with_compatibility_mode(Some(mode)));
    }
    Ok(api)
}

fn timeline_endpoint(
    kind: TimelineKind,
    tag: Option<String>,
) -> Result<StatusesEndpoint, CliError> {
    Ok(match kind {
        TimelineKind::Home => StatusesEndpoint::HomeTimeline,
        TimelineKind::Public => StatusesEndpoint::PublicTimeline { local: false },
        TimelineKind::Local => StatusesEndpoint::PublicTimeline { local: true },
        TimelineKind::Tag => StatusesEndpoint::TagTimeline {
            tag: tag.ok_or(CliError::Usage("--kind tag needs --tag"))?,
        },
        TimelineKind::Favourites => StatusesEndpoint::Favourites,
        TimelineKind::Bookmarks => StatusesEndpoint::Bookmarks,
        TimelineKind::Bubble => StatusesEndpoint::BubbleTimeline,
        TimelineKind::Trending => StatusesEndpoint::TrendingStatuses,
    })
}

/// Gated catalog entries and whether the current capabilities pass them.
fn support_matrix(api: &ApiClient) -> Vec<(&'static str, bool)> {
    let probe_id = || "0".to_string();
    vec![
        ("instance (v2)", api.supports(&InstanceV2Endpoint)),
        ("server rules", api.supports(&RulesEndpoint)),
        ("announcements", api.supports(&AnnouncementsEndpoint)),
        ("bookmarks", api.supports(&StatusesEndpoint::Bookmarks)),
        ("bubble timeline", api.supports(&StatusesEndpoint::BubbleTimeline)),
        ("trending statuses", api.supports(&StatusesEndpoint::TrendingStatuses)),
        ("trending tags", api.supports(&TagsEndpoint::Trending)),
        ("followed tags", api.supports(&TagsEndpoint::Followed)),
        (
            "follow tag",
            api.supports(&TagEndpoint::Follow { name: probe_id() }),
        ),
        (
            "familiar followers",
            api.supports(&FamiliarFollowersEndpoint { ids: vec![probe_id()] }),
        ),
        (
            "emoji reactions",
            api.supports(&StatusEndpoint::React {
                id: probe_id(),
                emoji: "👍".to_string(),
            }),
        ),
        (
            "translation",
            api.supports(&TranslationEndpoint::Translate {
                id: probe_id(),
                lang: None,
            }),
        ),
    ]
}

fn print_status(status: &Status) {
    let text: String = status.content.chars().take(72).collect();
    println!(
        "{}  @{}  {}  {}",
        status.id, status.account.acct, status.created_at, text
    );
}
