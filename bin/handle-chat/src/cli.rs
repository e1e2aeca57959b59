//! Command-line definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "handle-chat")]
#[command(version, about = "Terminal chat client for handle-server")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Base URL of handle-server
    #[arg(long, global = true, env = "HANDLE_SERVER_URL", default_value = "http://127.0.0.1:3000")]
    pub server: String,

    /// Session file (room and identity)
    #[arg(long, global = true, env = "HANDLE_SESSION_FILE", default_value = "handle-session.json")]
    pub store: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fill in the identity form and open a new room
    Start(StartArgs),

    /// Chat in the current room
    Chat,

    /// Print the suggested opening questions
    Questions,

    /// Forget the current session
    Leave,
}

#[derive(Args, Debug)]
pub struct StartArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long, default_value = "")]
    pub email: String,

    #[arg(long, default_value = "")]
    pub phone: String,

    /// Accept the Privacy Policy and the Terms of Use
    #[arg(long)]
    pub accept: bool,
}

/// One line typed at the chat prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput {
    Message(String),
    /// `?N`: send the N-th suggested question.
    Question(usize),
    Stop,
    Refresh(u64),
    Delete(u64),
    Copy(u64),
    Up(u64),
    Down(u64),
    Leave,
    Quit,
    Help,
    Empty,
}

impl ChatInput {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Self::Empty);
        }
        if let Some(n) = line.strip_prefix('?') {
            return n
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .map(Self::Question)
                .ok_or_else(|| format!("not a question number: {n}"));
        }
        let Some(command) = line.strip_prefix('/') else {
            return Ok(Self::Message(line.to_owned()));
        };

        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let mut slot = || {
            parts
                .next()
                .and_then(|s| s.parse::<u64>().ok())
                .ok_or_else(|| format!("/{name} needs a message number"))
        };
        match name {
            "stop" => Ok(Self::Stop),
            "refresh" => slot().map(Self::Refresh),
            "delete" => slot().map(Self::Delete),
            "copy" => slot().map(Self::Copy),
            "up" => slot().map(Self::Up),
            "down" => slot().map(Self::Down),
            "leave" => Ok(Self::Leave),
            "quit" | "exit" => Ok(Self::Quit),
            "help" => Ok(Self::Help),
            other => Err(format!("unknown command /{other}; try /help")),
        }
    }
}

pub const CHAT_HELP: &str = "\
  <text>        send a message (Enter while an answer is pending stops it)
  ?N            send suggested question N
  /stop         stop waiting for the pending answer
  /refresh N    ask message N again
  /delete N     remove message N
  /copy N       print the text of message N
  /up N, /down N  rate message N
  /leave        forget this session and exit
  /quit         exit";
