//! Plain-text rendering for the terminal front end.

use build_core::{AgentConfiguration, ChatMessage, ConnectionStatus, MessageRole};

const BAR_WIDTH: usize = 30;

pub fn message(message: &ChatMessage) -> String {
    let speaker = match message.role {
        MessageRole::User => "you",
        MessageRole::Agent => "architect",
    };
    format!("{}> {}", speaker, message.content)
}

/// `[#######.......]  42%` style bar.
pub fn progress_bar(progress: f64) -> String {
    let progress = progress.clamp(0.0, 100.0);
    let filled = ((progress / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {:>3.0}%",
        "#".repeat(filled),
        ".".repeat(BAR_WIDTH - filled),
        progress
    )
}

/// Multi-line description of a configuration.
pub fn config(config: &AgentConfiguration) -> String {
    let mut lines = vec![
        format!("  name:   {}", or_dash(&config.agent_name)),
        format!("  model:  {}", or_dash(&config.llm_model)),
    ];

    if !config.tools_to_activate.is_empty() {
        let tools: Vec<&str> = config.tools_to_activate.iter().map(String::as_str).collect();
        lines.push(format!("  tools:  {}", tools.join(", ")));
    }

    let prerequisites = &config.prerequisites;
    if !prerequisites.oauth.is_empty() {
        lines.push(format!("  oauth:  {}", prerequisites.oauth.join(", ")));
    }
    if !prerequisites.files.is_empty() {
        lines.push(format!("  files:  {}", prerequisites.files.join(", ")));
    }
    if config.needs_database() {
        lines.push("  database credentials required".to_string());
    }
    if let Some(index) = &prerequisites.pinecone_index_name {
        lines.push(format!("  index:  {}", index));
    }

    lines.join("\n")
}

pub fn connection(service: &str, status: Option<&ConnectionStatus>) -> String {
    match status.filter(|s| s.connected) {
        Some(status) => {
            let mut line = format!("{:<16} connected", service);
            if let Some(email) = &status.email {
                line.push_str(&format!(" as {}", email));
            }
            if let Some(expires) = &status.expires_at {
                line.push_str(&format!(" (expires {})", expires));
            }
            line
        }
        None => format!("{:<16} not connected", service),
    }
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}
