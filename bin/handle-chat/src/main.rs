//! handle-chat – terminal client for handle-server.
//!
//! `start` fills in the identity form and opens a room, `chat` runs the
//! conversation, `leave` forgets the session. Logs go to stderr so stdout
//! stays the transcript.

mod cli;
mod terminal;

use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use handle_widget::form::messages;
use handle_widget::{
    ChatController, ClientPollFallback, ComposerMode, FallbackSettings, Feedback, FileStore,
    FormRequirements, IdentityForm, ProxyClient, SessionState, TypingPresenter, TypingSettings,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{CHAT_HELP, ChatInput, Cli, Commands, StartArgs};
use crate::terminal::TerminalSink;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let store = FileStore::open(&cli.store)
        .with_context(|| format!("cannot open session file {}", cli.store.display()))?;
    let session = SessionState::new(Arc::new(store));
    let proxy = Arc::new(ProxyClient::new(cli.server.as_str())?);

    match cli.command {
        Commands::Start(args) => start(&proxy, &session, args).await,
        Commands::Chat => chat(proxy, session).await,
        Commands::Questions => {
            for (i, q) in proxy.default_questions().await?.iter().enumerate() {
                println!("?{}  {q}", i + 1);
            }
            Ok(())
        }
        Commands::Leave => {
            session.leave()?;
            println!("Session cleared.");
            Ok(())
        }
    }
}

/// `RUST_LOG` wins over `HANDLE_LOG`; default `warn`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(std::env::var("HANDLE_LOG").unwrap_or_else(|_| "warn".into())))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // Ignore the error: a subscriber may already be installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn start(proxy: &ProxyClient, session: &SessionState, args: StartArgs) -> anyhow::Result<()> {
    let form = IdentityForm {
        name: args.name,
        email: args.email,
        phone: args.phone,
        agree_privacy: args.accept,
        agree_terms: args.accept,
    };
    let identity = match form.validate(&FormRequirements::default()) {
        Ok(identity) => identity,
        Err(errors) => {
            for message in messages(&errors) {
                eprintln!("{message}");
            }
            bail!("the form has {} invalid field(s)", errors.field_errors().len());
        }
    };

    let room = proxy
        .create_room()
        .await
        .context("could not start a chat; please try again later")?;
    let started = session.begin(&room, &identity)?;
    info!(room = %started.room_uuid, "room created");

    println!("Chat ready. Run `handle-chat chat` to talk.");
    if let Some(greeting) = started.greeting_message {
        println!("{greeting}");
    }
    Ok(())
}

async fn chat(proxy: Arc<ProxyClient>, session: SessionState) -> anyhow::Result<()> {
    if session.load().is_none() {
        bail!("no active chat session; run `handle-chat start` first");
    }

    let questions = proxy.default_questions().await.unwrap_or_else(|e| {
        warn!(error = %e, "could not load suggested questions");
        Vec::new()
    });

    let controller = Arc::new(ChatController::new(
        proxy.clone(),
        ClientPollFallback::new(proxy, FallbackSettings::default()),
        TypingPresenter::new(Arc::new(TerminalSink::stdout()), TypingSettings::default()),
        session,
    ));

    controller.greeting();
    for (i, q) in questions.iter().enumerate() {
        println!("?{}  {q}", i + 1);
    }
    println!("Type /help for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = match ChatInput::parse(&line) {
            Ok(input) => input,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };

        match input {
            ChatInput::Message(text) => press_send(&controller, text),
            ChatInput::Question(n) => match questions.get(n - 1) {
                Some(q) => press_send(&controller, q.clone()),
                None => eprintln!("there is no suggested question {n}"),
            },
            ChatInput::Stop | ChatInput::Empty if controller.mode() == ComposerMode::Stop => {
                controller.stop();
            }
            ChatInput::Stop | ChatInput::Empty => {}
            ChatInput::Refresh(slot) => {
                let controller = Arc::clone(&controller);
                tokio::spawn(async move {
                    if let Err(e) = controller.refresh(slot).await {
                        eprintln!("{e}");
                    }
                });
            }
            ChatInput::Delete(slot) => controller.delete(slot),
            ChatInput::Copy(slot) => match controller.copy_text(slot) {
                Some(text) => println!("{text}"),
                None => eprintln!("message {slot} has no text yet"),
            },
            ChatInput::Up(slot) => controller.feedback(slot, Feedback::Up),
            ChatInput::Down(slot) => controller.feedback(slot, Feedback::Down),
            ChatInput::Help => println!("{CHAT_HELP}"),
            ChatInput::Leave => {
                controller.leave()?;
                println!("Session cleared.");
                break;
            }
            ChatInput::Quit => break,
        }
    }
    Ok(())
}

/// Same as the composer button: sends, or stops when an answer is pending.
fn press_send(controller: &Arc<ChatController>, text: String) {
    let controller = Arc::clone(controller);
    tokio::spawn(async move {
        if let Err(e) = controller.press_send(&text).await {
            eprintln!("{e}");
        }
    });
}
