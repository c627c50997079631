//! GemDuel player - terminal client binary.
//!
//! # Usage
//!
//! ```bash
//! # Create a room and wait for an opponent
//! gemduel-player --create "Friday Duel" --name Alice
//!
//! # Join it from another terminal
//! gemduel-player --join "Friday Duel" --name Bob --api-url http://10.0.0.5:8080
//! ```

use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{ArgGroup, Parser};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gemduel_player::infrastructure::config::{http_to_ws, load_dotenv_from_repo_root};
use gemduel_player::ui::{parse_command, render_message, render_state, Command};
use gemduel_player::{ApiAdapter, PlayerConfig, RoomOutcome, RoomSocketClient, SessionService};

/// GemDuel terminal player
#[derive(Parser, Debug)]
#[command(name = "gemduel-player")]
#[command(about = "Play GemDuel from the terminal")]
#[command(version)]
#[command(group(ArgGroup::new("room").required(true).args(["create", "join"])))]
struct Args {
    /// Create a room with this name
    #[arg(long)]
    create: Option<String>,

    /// Join the room with this name
    #[arg(long)]
    join: Option<String>,

    /// Your player name
    #[arg(short, long)]
    name: String,

    /// Room server base URL (overrides GEMDUEL_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Room socket base URL (overrides GEMDUEL_WS_URL)
    #[arg(long)]
    ws_url: Option<String>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "gemduel_player=info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting GemDuel player");

    let mut config = PlayerConfig::from_env();
    if let Some(api_url) = &args.api_url {
        config.api_base_url = api_url.trim_end_matches('/').to_string();
        config.ws_base_url = http_to_ws(&config.api_base_url);
    }
    if let Some(ws_url) = &args.ws_url {
        config.ws_base_url = ws_url.trim_end_matches('/').to_string();
    }

    let api = Arc::new(ApiAdapter::new(&config.api_base_url, config.request_timeout));
    let connection = Arc::new(RoomSocketClient::new());
    let session = SessionService::new(api, connection, config);

    let outcome = match (&args.create, &args.join) {
        (Some(room_name), _) => session.create_room(room_name, &args.name).await,
        (None, Some(room_name)) => session.join_room(room_name, &args.name).await,
        (None, None) => bail!("either --create or --join is required"),
    };
    let room_id = match outcome {
        RoomOutcome::Success { room_id } => room_id,
        RoomOutcome::Failure { message } => bail!(message),
    };

    session.set_on_message(|message| {
        if let Some(line) = render_message(message) {
            println!("{}", line);
        }
    });
    session
        .connect_websocket(&room_id)
        .await
        .context("failed to open room socket")?;
    println!("joined room {} as {}", room_id, args.name);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };

        match command {
            Command::Chat(text) => session.send_chat_message(&text).await,
            Command::Action(action) => session.perform_game_action(action).await,
            Command::Start => session.start_game().await,
            Command::State => println!("{}", render_state(&session.snapshot())),
            Command::Quit => break,
        }

        if !session.is_connected() {
            eprintln!("connection closed");
            break;
        }
    }

    session.disconnect().await;
    Ok(())
}
