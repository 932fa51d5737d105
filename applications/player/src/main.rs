/// Rotary Player - headless playlist rotation player
use clap::{Parser, Subcommand};
use rotary_player::{run_player, PlayerConfig, SimulatedTransport};
use rotary_playback::{QueueScheduler, ScrobbleService, ScrobbleSettings};
use rotary_server_client::RotaryServerClient;
use std::{path::PathBuf, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "rotary-player")]
#[command(about = "Rotary Player headless queue runner", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "ROTARY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play tracks from rotating playlists until interrupted
    Play {
        /// Playlist to enable (repeatable); defaults to the configured list
        #[arg(short, long = "playlist")]
        playlists: Vec<String>,
    },
    /// List the playlists the backend offers
    Playlists,
    /// Pick a random track from a playlist and show it
    Pick {
        /// Playlist name
        playlist: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rotary_player=info,rotary_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = PlayerConfig::load(cli.config.as_deref())?;
    config.validate()?;
    let client = Arc::new(RotaryServerClient::new(config.server_config())?);

    match cli.command {
        Commands::Play { playlists } => {
            play(&config, client, playlists).await?;
        }
        Commands::Playlists => {
            list_playlists(&client).await?;
        }
        Commands::Pick { playlist } => {
            pick(&config, &client, &playlist).await?;
        }
    }

    Ok(())
}

async fn play(
    config: &PlayerConfig,
    client: Arc<RotaryServerClient>,
    requested: Vec<String>,
) -> anyhow::Result<()> {
    let playlists = if !requested.is_empty() {
        requested
    } else if !config.playlists.is_empty() {
        config.playlists.clone()
    } else {
        let available = client.list_playlists().await?;
        let favorites: Vec<String> = available
            .iter()
            .filter(|p| p.favorite)
            .map(|p| p.name.clone())
            .collect();
        if favorites.is_empty() {
            available.into_iter().map(|p| p.name).collect()
        } else {
            favorites
        }
    };

    if playlists.is_empty() {
        anyhow::bail!("No playlists to play: configure some or add them on the backend");
    }

    tracing::info!("Starting Rotary Player");
    tracing::info!("Backend: {}", client.url().await);
    tracing::info!("Playlists: {}", playlists.join(", "));

    let scheduler = QueueScheduler::new(client.clone(), config.queue.clone());
    scheduler.set_enabled_playlists(playlists);
    let transport = Arc::new(SimulatedTransport::new());

    if config.scrobble {
        let service = ScrobbleService::new(
            client.clone(),
            transport.clone(),
            ScrobbleSettings::default(),
        );
        tokio::spawn(service.run(scheduler.subscribe()));
        tracing::info!("Scrobbling enabled");
    }

    scheduler.start();
    run_player(&scheduler, &transport, shutdown_signal()).await;

    let snapshot = scheduler.snapshot();
    tracing::info!(
        history = snapshot.history.len(),
        queued = snapshot.queue_len(),
        "Player stopped"
    );

    Ok(())
}

async fn list_playlists(client: &RotaryServerClient) -> anyhow::Result<()> {
    let playlists = client.list_playlists().await?;

    println!("Playlists:");
    for playlist in playlists {
        let marker = if playlist.favorite { "*" } else { " " };
        println!("  {} {} ({} tracks)", marker, playlist.name, playlist.track_count);
    }

    Ok(())
}

async fn pick(config: &PlayerConfig, client: &RotaryServerClient, playlist: &str) -> anyhow::Result<()> {
    let path = client.choose_track(playlist, &config.queue.filters).await?;
    let track = client.track_info(&path).await?;

    println!("{}", track.display_line());
    println!("  path:     {}", track.path);
    if let Some(album) = &track.album {
        println!("  album:    {album}");
    }
    if let Some(year) = track.year {
        println!("  year:     {year}");
    }
    println!("  duration: {}:{:02}", track.duration / 60, track.duration % 60);
    if !track.tags.is_empty() {
        println!("  tags:     {}", track.tags.join(", "));
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
