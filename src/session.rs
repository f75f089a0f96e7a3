//! Interactive review session.
//!
//! Renders the screen on every engine state change and reads operator
//! commands from stdin. Row numbers refer to the currently filtered view.

use std::str::FromStr;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::engine::ReviewEngine;
use crate::store::{DescriptionStore, PendingDescription};
use crate::ui;

const HELP: &str = "commands: search <text> | clear | accept <n> | reject <n> | \
                    preview <n> | close | refresh | help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Search(String),
    ClearSearch,
    Accept(usize),
    Reject(usize),
    Preview(usize),
    ClosePreview,
    Refresh,
    Help,
    Quit,
}

impl FromStr for SessionCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map(|(w, r)| (w, r.trim()))
            .unwrap_or((line, ""));

        let row = |rest: &str| -> Result<usize, String> {
            match rest.parse::<usize>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(format!("`{word}` needs a row number, got {rest:?}")),
            }
        };

        match word.to_lowercase().as_str() {
            "search" | "/" if rest.is_empty() => Ok(SessionCommand::ClearSearch),
            "search" | "/" => Ok(SessionCommand::Search(rest.to_string())),
            "clear" => Ok(SessionCommand::ClearSearch),
            "accept" | "a" => row(rest).map(SessionCommand::Accept),
            "reject" | "r" => row(rest).map(SessionCommand::Reject),
            "preview" | "p" => row(rest).map(SessionCommand::Preview),
            "close" => Ok(SessionCommand::ClosePreview),
            "refresh" => Ok(SessionCommand::Refresh),
            "help" | "?" => Ok(SessionCommand::Help),
            "quit" | "exit" | "q" => Ok(SessionCommand::Quit),
            "" => Err("empty command".to_string()),
            other => Err(format!("unknown command `{other}`; type `help`")),
        }
    }
}

/// Looks up a 1-based row of the filtered view.
fn row_item<S: DescriptionStore>(
    engine: &ReviewEngine<S>,
    row: usize,
) -> Result<PendingDescription, String> {
    row.checked_sub(1)
        .and_then(|index| engine.visible_items().into_iter().nth(index))
        .ok_or_else(|| format!("no row {row} in the current view"))
}

/// Applies one command. Returns `Ok(false)` when the session should end.
/// `Err` carries a usage problem for the operator; engine failures are
/// reported through the engine state instead.
pub async fn execute<S: DescriptionStore>(
    engine: &ReviewEngine<S>,
    command: SessionCommand,
) -> Result<bool, String> {
    match command {
        SessionCommand::Search(term) => engine.set_search_term(term),
        SessionCommand::ClearSearch => engine.set_search_term(""),
        SessionCommand::Accept(row) => {
            let item = row_item(engine, row)?;
            engine.accept(&item).await;
        }
        SessionCommand::Reject(row) => {
            let item = row_item(engine, row)?;
            engine.reject(&item).await;
        }
        SessionCommand::Preview(row) => {
            let item = row_item(engine, row)?;
            let url = item
                .value
                .image_url
                .ok_or_else(|| format!("row {row} has no image"))?;
            engine.set_selected_image_preview_url(Some(url));
        }
        SessionCommand::ClosePreview => engine.set_selected_image_preview_url(None),
        SessionCommand::Refresh => engine.load().await,
        SessionCommand::Help => println!("{HELP}"),
        SessionCommand::Quit => return Ok(false),
    }
    Ok(true)
}

/// Runs the interactive loop until `quit` or end of input.
pub async fn run<S: DescriptionStore>(engine: &ReviewEngine<S>) -> Result<()> {
    let mut rx = engine.subscribe();
    let renderer = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let screen = ui::render(&rx.borrow_and_update());
            println!("\n{screen}");
        }
    });

    println!("{HELP}");
    engine.load().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let outcome = match line.parse::<SessionCommand>() {
            Ok(command) => execute(engine, command).await,
            Err(usage) => Err(usage),
        };
        match outcome {
            Ok(true) => {}
            Ok(false) => break,
            Err(usage) => eprintln!("{usage}"),
        }
    }

    renderer.abort();
    Ok(())
}
