//! Interactive build conversation.

use std::error::Error;
use std::fs::File;
use std::num::ParseIntError;
use std::path::{Path, PathBuf};

use build_client::{BuildClient, FileUpload};
use build_core::{BuildState, Intent, ServerModal};
use build_session::{
    AppContext, BuildController, ControllerError, DbCredentials, ProgressHandle, DEFAULT_DB_PORT,
};
use tracing::{debug, warn};

use crate::input::{Command, Input};
use crate::render;

const HELP: &str = "Commands: /approve, /upload <path>, /credentials <.env path>, /quit";

pub struct BuildOptions {
    pub prompt: String,
    pub credentials_env: Option<PathBuf>,
}

type Controller = BuildController<BuildClient>;

pub async fn run(context: &AppContext, options: BuildOptions) -> Result<(), Box<dyn Error>> {
    let mut controller = context.build_controller();
    let mut input = Input::stdin(context.shutdown_token());
    let mut printed = 0;
    let mut credentials_file = options.credentials_env;

    println!("{}", HELP);
    let outcome = controller.start(&options.prompt).await;
    if !report(&controller, &mut printed, outcome) {
        return Ok(());
    }

    loop {
        if let Some(request) = controller.acknowledge_request() {
            debug!(modal = ?request.modal, data = ?request.data, "server requested a modal");
        }

        if controller
            .dispatcher()
            .is_open(ServerModal::DatabaseCredentials)
        {
            let from_file = match credentials_file.take() {
                Some(path) => match read_credentials(&path) {
                    Ok(credentials) => Some(credentials),
                    Err(e) => {
                        eprintln!("Could not read credentials from {}: {}", path.display(), e);
                        None
                    }
                },
                None => None,
            };
            let credentials = match from_file {
                Some(credentials) => Some(credentials),
                None => ask_credentials(&mut input).await?,
            };
            let Some(credentials) = credentials else {
                controller.dismiss_credentials();
                println!("Database setup skipped.");
                continue;
            };
            let outcome = controller.submit_credentials(&credentials).await;
            if !report(&controller, &mut printed, outcome) {
                break;
            }
            continue;
        }

        if let Some(progress) = controller.take_progress() {
            show_progress(&controller, progress).await;
            controller.mark_ready();
            print_new(&controller, &mut printed);
        }

        if controller.state().last_state == Some(BuildState::Completed) {
            if let Some(agent_id) = &controller.state().agent_id {
                println!("Agent saved. Chat with it using: architect chat --agent-id {}", agent_id);
            }
            break;
        }

        if controller.state().awaiting_approval {
            println!("Type /approve to build this agent, or describe what to change.");
        }

        let Some(line) = input.line("you> ").await? else {
            break;
        };

        let outcome = match Command::parse(&line) {
            Command::Empty => continue,
            Command::Quit => break,
            Command::Approve => controller.approve().await,
            Command::Message(text) => controller.send_message(text).await,
            Command::Upload(path) => match FileUpload::from_path(path).await {
                Ok(file) => controller.upload_file(file).await,
                Err(e) => {
                    eprintln!("Could not read {}: {}", path, e);
                    continue;
                }
            },
            Command::Credentials(path) => {
                credentials_file = Some(PathBuf::from(path));
                continue;
            }
        };

        if !report(&controller, &mut printed, outcome) {
            break;
        }
    }

    controller.shutdown();
    Ok(())
}

/// Print what changed. Returns `false` when the conversation should end.
fn report(
    controller: &Controller,
    printed: &mut usize,
    outcome: Result<Vec<Intent>, ControllerError>,
) -> bool {
    print_new(controller, printed);

    match outcome {
        Ok(intents) => {
            for intent in &intents {
                show_intent(controller, intent);
            }
            true
        }
        Err(ControllerError::Cancelled) => false,
        Err(e) => {
            warn!(error = %e, "build step failed");
            eprintln!("{}", e.user_message());
            controller.session().is_some()
        }
    }
}

fn show_intent(controller: &Controller, intent: &Intent) {
    match intent {
        Intent::ShowProposedConfig => {
            if let Some(config) = controller
                .session()
                .and_then(|s| s.agent_config.as_ref())
            {
                println!("Proposed configuration:\n{}", render::config(config));
            }
        }
        Intent::RevealArchitecture => {
            if let Some(config) = &controller.state().agent_config {
                println!("Architecture:\n{}", render::config(config));
            }
        }
        Intent::ShowError(message) => eprintln!("{}", message),
        Intent::ShowCredentialsError(message) => eprintln!("{}", message),
        _ => {}
    }
}

fn print_new(controller: &Controller, printed: &mut usize) {
    let messages = controller.transcript().messages();
    for message in messages.iter().skip(*printed) {
        if message.is_agent() {
            println!("{}", render::message(message));
        }
    }
    *printed = messages.len();
}

async fn show_progress(controller: &Controller, mut handle: ProgressHandle) {
    let mut step = None;
    loop {
        tokio::select! {
            biased;
            done = &mut handle.completion => {
                if done.is_ok() {
                    println!("{}", render::progress_bar(100.0));
                }
                break;
            }
            changed = handle.updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let update = handle.current();
                if step != Some(update.step_index) {
                    step = Some(update.step_index);
                    if let Some(label) = controller.step_label(update.step_index) {
                        println!("{}", label);
                    }
                }
                debug!(progress = update.progress, "build progress");
            }
        }
    }
}

fn read_credentials(path: &Path) -> Result<DbCredentials, Box<dyn Error>> {
    let file = File::open(path)?;
    Ok(DbCredentials::from_env_reader(file)?)
}

async fn ask_credentials(input: &mut Input) -> Result<Option<DbCredentials>, Box<dyn Error>> {
    println!("The agent needs database access. Leave the host empty to skip.");

    let Some(host) = input.line("host: ").await?.filter(|h| !h.is_empty()) else {
        return Ok(None);
    };
    let port = loop {
        let Some(line) = input.line(&format!("port [{}]: ", DEFAULT_DB_PORT)).await? else {
            return Ok(None);
        };
        match port_or_default(&line) {
            Ok(port) => break port,
            Err(e) => eprintln!("Invalid port {:?}: {}", line, e),
        }
    };
    let Some(database) = input.line("database: ").await? else {
        return Ok(None);
    };
    let Some(username) = input.line("username: ").await? else {
        return Ok(None);
    };
    let Some(password) = input.line("password: ").await? else {
        return Ok(None);
    };

    Ok(Some(DbCredentials::new(host, port, database, username, password)))
}

/// Empty input means the default port.
fn port_or_default(input: &str) -> Result<u16, ParseIntError> {
    let input = input.trim();
    if input.is_empty() {
        Ok(DEFAULT_DB_PORT)
    } else {
        input.parse()
    }
}
