//! Interface de linha de comando do pxreview baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (list, accept, reject,
//! review) e flags globais (--config, --verbose).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// pxreview — Revisão de descrições de produto geradas antes de chegarem ao catálogo.
#[derive(Debug, Parser)]
#[command(name = "pxreview", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Caminho do arquivo de configuração (padrão: ./pxreview.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Habilita logs de depuração e imprime os registros de auditoria.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Lista as descrições pendentes.
    List {
        /// Mostra apenas itens cujo nome ou descrição contém este texto.
        #[arg(long)]
        search: Option<String>,
    },

    /// Grava a descrição pendente no produto e a remove da fila.
    Accept {
        /// Id of the pending description.
        id: String,
    },

    /// Remove a descrição pendente sem alterar o produto.
    Reject {
        /// Id of the pending description.
        id: String,
    },

    /// Inicia uma sessão de revisão interativa.
    Review,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_list_with_search() {
        let cli = Cli::parse_from(["pxreview", "list", "--search", "blue"]);
        match cli.command {
            Command::List { search } => assert_eq!(search.as_deref(), Some("blue")),
            _ => panic!("expected List command"),
        }
    }

    #[test]
    fn cli_parses_accept_subcommand() {
        let cli = Cli::parse_from(["pxreview", "accept", "c1a2"]);
        match cli.command {
            Command::Accept { id } => assert_eq!(id, "c1a2"),
            _ => panic!("expected Accept command"),
        }
    }

    #[test]
    fn cli_parses_global_flags() {
        let cli = Cli::parse_from(["pxreview", "--config", "alt.toml", "--verbose", "review"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("alt.toml")));
        assert!(matches!(cli.command, Command::Review));
    }

    #[test]
    fn cli_requires_id_for_reject() {
        assert!(Cli::try_parse_from(["pxreview", "reject"]).is_err());
    }

    #[test]
    fn cli_verify() {
        Cli::command().debug_assert();
    }
}
