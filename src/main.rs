mod cli;
mod config;
mod engine;
mod error;
mod filter;
mod session;
mod state_machine;
mod store;
mod ui;

use anyhow::{Result, bail};
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Command};
use config::ReviewConfig;
use engine::ReviewEngine;
use state_machine::Decision;
use store::{DescriptionStore, HttpDescriptionStore};
use ui::LoadingSpinner;

// Events are targeted at the binary's crate name, not the package name.
fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        concat!(env!("CARGO_CRATE_NAME"), "=debug")
    } else {
        concat!(env!("CARGO_CRATE_NAME"), "=info")
    }
}

fn init_tracing(verbose: bool) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive(verbose).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn load_with_spinner<S: DescriptionStore>(engine: &ReviewEngine<S>) {
    let spinner = LoadingSpinner::start("Loading pending descriptions…");
    engine.load().await;
    spinner.finish();
}

async fn list<S: DescriptionStore>(
    engine: &ReviewEngine<S>,
    search: Option<String>,
) -> Result<()> {
    load_with_spinner(engine).await;
    if let Some(term) = search {
        engine.set_search_term(term);
    }
    let snapshot = engine.snapshot();
    println!("{}", ui::render(&snapshot));
    if let Some(error) = snapshot.error {
        bail!(error);
    }
    Ok(())
}

async fn decide<S: DescriptionStore>(
    engine: &ReviewEngine<S>,
    decision: Decision,
    id: &str,
    verbose: bool,
) -> Result<()> {
    load_with_spinner(engine).await;
    let snapshot = engine.snapshot();
    if let Some(error) = snapshot.error {
        bail!(error);
    }
    let Some(item) = snapshot.items.into_iter().find(|i| i.id == id) else {
        bail!("No pending description with id {id}");
    };

    let record = match decision {
        Decision::Accept => engine.accept(&item).await,
        Decision::Reject => engine.reject(&item).await,
    };
    println!("{}", ui::render(&engine.snapshot()));
    ui::print_record(&record, verbose);

    if !record.outcome.is_success() {
        bail!(
            record
                .error
                .unwrap_or_else(|| format!("review of {id} did not complete"))
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = ReviewConfig::load(cli.config.as_deref())?;
    let store = HttpDescriptionStore::from_config(&config)?;
    let engine = ReviewEngine::new(store);
    tracing::debug!(project = %config.project_key, container = %config.container, "store configured");

    match cli.command {
        Command::List { search } => list(&engine, search).await?,
        Command::Accept { id } => decide(&engine, Decision::Accept, &id, cli.verbose).await?,
        Command::Reject { id } => decide(&engine, Decision::Reject, &id, cli.verbose).await?,
        Command::Review => session::run(&engine).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use crate::store::memory::{MemoryStore, pending};

    #[test]
    fn default_directive_targets_this_crate() {
        let crate_name = module_path!().split("::").next().unwrap();
        assert_eq!(default_directive(false), format!("{crate_name}=info"));
        assert_eq!(default_directive(true), format!("{crate_name}=debug"));
    }

    #[tokio::test]
    async fn list_fails_when_fetch_fails() {
        let engine = ReviewEngine::new(MemoryStore::with_items(vec![pending("1", "Cap", None)]));
        engine
            .store()
            .fail_next_fetch(StoreError::Unauthorized("invalid_token".into()));

        let err = list(&engine, None).await.unwrap_err();
        assert_eq!(err.to_string(), "Error: invalid_token");
    }

    #[tokio::test]
    async fn list_succeeds_with_search() {
        let engine = ReviewEngine::new(MemoryStore::with_items(vec![pending("1", "Cap", None)]));
        list(&engine, Some("cap".into())).await.unwrap();
        assert_eq!(engine.snapshot().search_term, "cap");
    }
}
