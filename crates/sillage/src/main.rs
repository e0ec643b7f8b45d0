//! An interactive terminal client.

#[macro_use]
extern crate tracing;

use std::env;
use std::io::Write as _;
use std::path::PathBuf;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use sillage::core::transcript::Role;
use sillage::{Session, SessionSnapshot, http_session};
use tokio::io::{self, AsyncBufReadExt};

const BAR_CHAR: &str = "▎";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let endpoint = env::var("SILLAGE_ENDPOINT").ok();
    let thread_file = env::var_os("SILLAGE_THREAD_FILE")
        .map(PathBuf::from)
        .or_else(|| {
            dirs::data_dir().map(|dir| dir.join("sillage").join("thread_id"))
        });

    let (session, transport) = http_session(endpoint, thread_file);
    if let Err(err) = transport.check_health().await {
        eprintln!(
            "{}",
            format!("⚠️  Assistant looks unreachable: {err}").bright_yellow()
        );
    }
    println!(
        "{}",
        format!(
            "Thread {}. Type /new for a new conversation, /quit to exit.",
            session.snapshot().thread_id
        )
        .dimmed()
    );

    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = read_line().await else {
            break;
        };
        match line.trim() {
            "" => continue,
            "/quit" => break,
            "/new" => {
                if session.reset().await {
                    println!(
                        "{}",
                        format!("New thread {}", session.snapshot().thread_id)
                            .dimmed()
                    );
                }
                continue;
            }
            query => {
                if session.submit(query).await {
                    render_exchange(&session).await;
                }
            }
        }
    }
}

/// Prints the answer of the running exchange as it is revealed.
async fn render_exchange(session: &Session) {
    let mut snapshot_rx = session.subscribe();
    let answer_idx = snapshot_rx.borrow_and_update().messages.len();

    let progress_bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {wide_msg}") {
        progress_bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    progress_bar.set_message("🤔 Thinking...");
    progress_bar.enable_steady_tick(Duration::from_millis(100));

    let mut printed = String::new();
    loop {
        let snapshot = snapshot_rx.borrow_and_update().clone();
        let displayed = answer_text(&snapshot, answer_idx);

        if displayed.is_empty() && snapshot.busy {
            if let Some(activity) = &snapshot.activity {
                progress_bar.set_message(activity.clone());
            }
        } else if displayed != printed {
            if printed.is_empty() {
                progress_bar.finish_and_clear();
                print!("{}🤖 ", BAR_CHAR.bright_cyan());
            }
            match displayed.strip_prefix(printed.as_str()) {
                Some(suffix) => print!("{}", suffix.bright_white()),
                // The answer was revised, start over on a new line.
                None => print!("\n{}🤖 {}", BAR_CHAR.bright_cyan(), displayed),
            }
            std::io::stdout().flush().ok();
            printed = displayed.to_owned();
        }

        if !snapshot.busy {
            progress_bar.finish_and_clear();
            if !printed.is_empty() {
                println!();
            }
            if let Some(error) = &snapshot.error {
                println!("{}", error.bright_red());
            }
            break;
        }
        if snapshot_rx.changed().await.is_err() {
            break;
        }
    }
}

fn answer_text(snapshot: &SessionSnapshot, answer_idx: usize) -> &str {
    snapshot
        .messages
        .get(answer_idx)
        .filter(|m| m.role == Role::Assistant)
        .map(|m| m.displayed.as_str())
        .unwrap_or_default()
}

async fn read_line() -> Option<String> {
    let mut stdin = io::BufReader::new(io::stdin());
    let mut line = String::new();

    match stdin.read_line(&mut line).await {
        Ok(count) => {
            if count == 0 {
                return None;
            }
            Some(line)
        }
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
