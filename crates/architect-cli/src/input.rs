//! Line input from stdin that gives up on shutdown.

use std::io::{self, Write};

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio_util::sync::CancellationToken;

pub struct Input {
    lines: Lines<BufReader<Stdin>>,
    shutdown: CancellationToken,
}

impl Input {
    pub fn stdin(shutdown: CancellationToken) -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            shutdown,
        }
    }

    /// Print a prompt and read one trimmed line.
    ///
    /// Returns `None` at end of input or once shutdown has been requested.
    pub async fn line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        print!("{}", prompt);
        io::stdout().flush()?;

        tokio::select! {
            _ = self.shutdown.cancelled() => Ok(None),
            line = self.lines.next_line() => Ok(line?.map(|l| l.trim().to_string())),
        }
    }
}

/// What the user typed at the build prompt.
#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Empty,
    Quit,
    Approve,
    Upload(&'a str),
    Credentials(&'a str),
    Message(&'a str),
}

impl<'a> Command<'a> {
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }

        let (head, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        match head {
            "/quit" | "/exit" => Command::Quit,
            "/approve" => Command::Approve,
            "/upload" if !rest.is_empty() => Command::Upload(rest),
            "/credentials" if !rest.is_empty() => Command::Credentials(rest),
            _ => Command::Message(line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("   "), Command::Empty);
        assert_eq!(Command::parse("/quit"), Command::Quit);
        assert_eq!(Command::parse("/approve"), Command::Approve);
        assert_eq!(Command::parse("/upload  ./leads.csv "), Command::Upload("./leads.csv"));
        assert_eq!(Command::parse("/credentials .env"), Command::Credentials(".env"));
        assert_eq!(
            Command::parse("use the support inbox"),
            Command::Message("use the support inbox")
        );
    }

    #[test]
    fn test_command_without_argument_is_a_message() {
        assert_eq!(Command::parse("/upload"), Command::Message("/upload"));
    }
}
