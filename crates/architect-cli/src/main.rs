//! `architect` - design, build and chat with agents from the terminal.
//!
//! Configuration via .env file or environment variables:
//!   BACKEND_URL                 - Build backend (default: http://localhost:8081)
//!   SUPABASE_URL                - Supabase project URL (required)
//!   SUPABASE_ANON_KEY           - Supabase anon key (required)
//!   BUILD_REQUEST_TIMEOUT_SECS  - Per-request timeout (default: 60)
//!   BUILD_PROGRESS_TICK_MS      - Progress tick interval (default: 100)
//!   ARCHITECT_USER_EMAIL        - Email sent to the agents API
//!   RUST_LOG                    - Log filter (default: info)

mod build;
mod input;
mod render;

use std::error::Error;
use std::path::PathBuf;

use build_client::{BuildClient, SaveAgentRequest};
use build_core::{
    strip_query, AuthOutcome, ConnectionMap, OAuthProvider, ProviderScope, RedirectParams,
};
use build_session::{AppContext, ControllerError, AGENT_CHAT_ERROR_MESSAGE};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::build::BuildOptions;
use crate::input::Input;

#[derive(Debug, Parser)]
#[command(name = "architect")]
#[command(about = "Design, build and chat with AI agents")]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Build an agent through a conversation with the architect
    Build {
        /// What the agent should do
        #[arg(long)]
        prompt: String,

        /// .env file to answer database credential requests with
        #[arg(long)]
        credentials_env: Option<PathBuf>,
    },

    /// Ask the architect for a configuration in one shot
    Design {
        /// What the agent should do
        #[arg(long)]
        prompt: String,

        /// Save the designed agent
        #[arg(long)]
        save: bool,
    },

    /// Manage OAuth connections
    Connections {
        #[command(subcommand)]
        command: ConnectionsCommand,
    },

    /// Chat with a saved agent
    Chat {
        #[arg(long)]
        agent_id: String,
    },
}

#[derive(Debug, Subcommand)]
enum ConnectionsCommand {
    /// Show which services are connected
    List,

    /// Print the authorization URL for a service or provider
    Connect { service: String },

    /// Remove stored tokens for a service, a provider, or "all"
    Disconnect { service: String },

    /// Handle the URL the browser was redirected to after authorizing
    Callback { url: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let context = AppContext::from_env()?;

    let shutdown = context.shutdown_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted");
            shutdown.cancel();
        }
    });

    let result = match args.command {
        Commands::Build {
            prompt,
            credentials_env,
        } => {
            build::run(
                &context,
                BuildOptions {
                    prompt,
                    credentials_env,
                },
            )
            .await
        }
        Commands::Design { prompt, save } => design(&context.client(), &prompt, save).await,
        Commands::Connections { command } => connections(&context.client(), command).await,
        Commands::Chat { agent_id } => chat(&context, agent_id).await,
    };

    context.shutdown();
    result
}

async fn design(client: &BuildClient, prompt: &str, save: bool) -> Result<(), Box<dyn Error>> {
    let config = client.architect(prompt).await?;
    println!("{}", render::config(&config));

    if save {
        let request = SaveAgentRequest::from_config(&config, &client.config().user_email);
        let saved = client.save_agent(&request).await?;
        println!("Saved agent {}", saved.id);
    } else {
        println!("{}", serde_json::to_string_pretty(&config)?);
    }
    Ok(())
}

async fn connections(
    client: &BuildClient,
    command: ConnectionsCommand,
) -> Result<(), Box<dyn Error>> {
    match command {
        ConnectionsCommand::List => list_connections(client).await,
        ConnectionsCommand::Connect { service } => {
            let provider = provider_for(&service)?;
            let url = client.auth_url(provider).await?;
            println!("Open this URL to connect {}:\n{}", provider, url);
            Ok(())
        }
        ConnectionsCommand::Disconnect { service } => {
            let scope = if service == "all" {
                ProviderScope::All
            } else {
                ProviderScope::One(provider_for(&service)?)
            };
            client.clear_tokens(scope).await?;
            println!("Disconnected {}", scope.as_str());

            let mut map = ConnectionMap::from_tokens(&client.list_tokens().await?);
            match scope {
                ProviderScope::One(provider) => map.disconnect(provider),
                ProviderScope::All => {
                    for provider in OAuthProvider::ALL {
                        map.disconnect(provider);
                    }
                }
            }
            print_connections(&map);
            Ok(())
        }
        ConnectionsCommand::Callback { url } => {
            let params = RedirectParams::from_url(&url);
            debug!(?params, return_to = strip_query(&url), "handling redirect");
            match params.auth {
                Some(AuthOutcome::Success) => println!("Connection authorized."),
                Some(AuthOutcome::Error) => eprintln!("Authorization failed. Please try again."),
                None if params.is_empty() => println!("Nothing to do for {}", url),
                None => {}
            }
            if params.navigate_to_connections() {
                list_connections(client).await?;
            }
            Ok(())
        }
    }
}

async fn list_connections(client: &BuildClient) -> Result<(), Box<dyn Error>> {
    print_connections(&ConnectionMap::from_tokens(&client.list_tokens().await?));
    Ok(())
}

fn print_connections(map: &ConnectionMap) {
    for provider in OAuthProvider::ALL {
        for service in provider.services() {
            println!("{}", render::connection(service, map.get(service)));
        }
    }
}

fn provider_for(service: &str) -> Result<OAuthProvider, String> {
    OAuthProvider::for_service(service)
        .ok_or_else(|| format!("unknown service or provider: {}", service))
}

async fn chat(context: &AppContext, agent_id: String) -> Result<(), Box<dyn Error>> {
    let mut controller = context.build_controller();
    controller.set_agent_id(agent_id);
    let mut input = Input::stdin(context.shutdown_token());

    println!("Chatting with your agent. Type /quit to leave.");
    while let Some(line) = input.line("you> ").await? {
        if line.is_empty() {
            continue;
        }
        if line == "/quit" || line == "/exit" {
            break;
        }
        match controller.chat_with_agent(&line).await {
            Ok(reply) => println!("agent> {}", reply),
            Err(ControllerError::Cancelled) => break,
            Err(e) => {
                debug!(error = %e, "agent chat failed");
                println!("agent> {}", AGENT_CHAT_ERROR_MESSAGE);
            }
        }
    }

    controller.shutdown();
    Ok(())
}
