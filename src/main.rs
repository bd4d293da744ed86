use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

use ridewait::app::{App, AppEvent, Screen};
use ridewait::auth::{AuthProvider, FirebaseAuth};
use ridewait::config::Config;
use ridewait::favorites::{FavoritesSink, FirebaseFavorites};
use ridewait::feed::{load_rides, FeedClient, RideStatus};
use ridewait::storage::{Database, DatabaseError};
use ridewait::ui;
use ridewait::util::{display_width, sanitize_label};

/// Get the config directory path (~/.config/ridewait/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("ridewait"))
}

/// Create the config directory with user-only permissions.
fn ensure_config_dir(config_dir: &Path) -> Result<()> {
    if !config_dir.exists() {
        std::fs::create_dir_all(config_dir).context("Failed to create config directory")?;
        tracing::info!(path = %config_dir.display(), "Created config directory");
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match std::fs::metadata(config_dir) {
            Ok(metadata) => {
                let mut perms = metadata.permissions();
                perms.set_mode(0o700);
                if let Err(e) = std::fs::set_permissions(config_dir, perms) {
                    tracing::warn!(
                        path = %config_dir.display(),
                        error = %e,
                        "Failed to set config directory permissions to 0700"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    path = %config_dir.display(),
                    error = %e,
                    "Failed to read config directory metadata"
                );
            }
        }
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "ridewait", about = "Theme park ride wait times in your terminal")]
struct Args {
    /// Skip the login screen and browse as a guest
    #[arg(long)]
    guest: bool,

    /// Print the ranked ride list to stdout and exit
    #[arg(long, conflicts_with = "list_favorites")]
    list: bool,

    /// Print locally stored favorites for --user and exit
    #[arg(long, requires = "user")]
    list_favorites: bool,

    /// User id whose favorites to list
    #[arg(long, value_name = "UID")]
    user: Option<String>,

    /// Config file (default: ~/.config/ridewait/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_dir = get_config_dir()?;
    ensure_config_dir(&config_dir)?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    tracing::debug!(?config, "Configuration loaded");

    let feed_client = FeedClient::new(
        config.feed_endpoint()?,
        config.connect_timeout(),
        config.read_timeout(),
        &config.user_agent,
    )
    .context("Failed to build HTTP client")?;

    if args.list {
        match load_rides(&feed_client).await {
            Ok(rides) => {
                print_rides(&config.park_name, &rides);
                return Ok(());
            }
            Err(e) => {
                eprintln!("Could not load {} data: {}", config.park_name, e);
                std::process::exit(1);
            }
        }
    }

    let db_path = config_dir.join("favorites.db");

    if args.list_favorites {
        if !config.favorites_are_local() {
            anyhow::bail!(
                "--list-favorites only reads the local store, but favorites are saved to \
                 firebase.database_url; view them in the Firebase console instead"
            );
        }
        let user = args.user.as_deref().unwrap_or_default();
        let db = open_database(&db_path).await?;
        let favorites = db
            .favorites_for(user)
            .await
            .context("Failed to read favorites")?;
        if favorites.is_empty() {
            println!("No favorites saved for {}.", user);
        }
        for favorite in favorites {
            let saved = chrono::DateTime::from_timestamp(favorite.saved_at, 0)
                .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            println!("{}  {}", saved, sanitize_label(&favorite.ride_name));
        }
        return Ok(());
    }

    let http = reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(config.connect_timeout())
        .read_timeout(config.read_timeout())
        .build()
        .context("Failed to build HTTP client")?;

    let auth: Option<Arc<dyn AuthProvider>> = match config.firebase_api_key() {
        Some(key) if !args.guest => {
            let provider = match &config.firebase.auth_base_url {
                Some(base) => FirebaseAuth::with_base_url(http.clone(), key, base),
                None => FirebaseAuth::new(http.clone(), key),
            };
            Some(Arc::new(provider))
        }
        Some(_) => None,
        None => {
            tracing::info!("No Firebase API key configured, running in guest mode");
            None
        }
    };

    let favorites: Arc<dyn FavoritesSink> = match config.database_endpoint()? {
        Some(url) => Arc::new(FirebaseFavorites::new(http, url)),
        None => Arc::new(open_database(&db_path).await?),
    };

    let mut app = App::new(config.park_name.clone(), feed_client, auth, favorites);
    if args.guest {
        app.screen = Screen::Rides;
    }

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);
    ui::run(&mut app, event_tx, event_rx).await?;

    Ok(())
}

async fn open_database(path: &Path) -> Result<Database> {
    let path_str = path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    match Database::open(path_str).await {
        Ok(db) => Ok(db),
        Err(DatabaseError::InstanceLocked) => {
            eprintln!(
                "Error: Another instance of ridewait appears to be running. Please close it and try again."
            );
            std::process::exit(1);
        }
        Err(e) => Err(anyhow::anyhow!("Failed to open database: {}", e)),
    }
}

fn print_rides(park_name: &str, rides: &[RideStatus]) {
    if rides.is_empty() {
        println!("No rides found for {}.", park_name);
        return;
    }

    let names: Vec<_> = rides.iter().map(|r| sanitize_label(&r.name)).collect();
    let name_width = names.iter().map(|n| display_width(n)).max().unwrap_or(0);

    println!("{}", park_name);
    for (ride, name) in rides.iter().zip(&names) {
        let pad = name_width - display_width(name);
        println!(
            "{}{}  Status: {} | Wait: {}",
            name,
            " ".repeat(pad),
            ride.status_label(),
            ride.wait_label()
        );
    }
}
