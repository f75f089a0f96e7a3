//! Interface de terminal do pxreview — tela de revisão e spinner.
//!
//! [`render`] transforma um [`WorkflowViewState`] em texto: mensagens de status,
//! depois o aviso de carregamento, o aviso de fila vazia ou a tabela de descrições
//! pendentes, e por fim o preview da imagem. O [`LoadingSpinner`] usa `indicatif`.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::engine::WorkflowViewState;
use crate::filter::LoadState;
use crate::state_machine::{ReviewRecord, SagaOutcome};
use crate::store::PendingDescription;

const NAME_WIDTH: usize = 24;
const DESCRIPTION_WIDTH: usize = 48;
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Spinner exibido enquanto uma carga está em andamento.
pub struct LoadingSpinner {
    pb: ProgressBar,
}

impl LoadingSpinner {
    pub fn start(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Self { pb }
    }

    pub fn finish(self) {
        self.pb.finish_and_clear();
    }
}

/// Renderiza a tela de revisão inteira.
pub fn render(state: &WorkflowViewState) -> String {
    let green = Style::new().green().bold();
    let red = Style::new().red().bold();
    let dim = Style::new().dim();
    let mut out = Vec::new();

    if let Some(error) = &state.error {
        out.push(format!("{} {error}", red.apply_to("✗")));
    }
    if let Some(message) = &state.success_message {
        out.push(format!("{} {message}", green.apply_to("✓")));
    }

    match state.load_state() {
        LoadState::Loading => out.push("Loading pending descriptions…".to_string()),
        LoadState::Empty => out.push("No pending descriptions found.".to_string()),
        // O erro de carga exibido acima ocupa o lugar da lista.
        LoadState::Failed => {}
        LoadState::Ready => {
            let visible = state.visible_items();
            let total = state.items.len();
            if state.search_term.is_empty() {
                out.push(format!("Pending descriptions ({total})"));
            } else {
                out.push(format!(
                    "Pending descriptions ({} of {total}) matching {:?}",
                    visible.len(),
                    state.search_term
                ));
            }

            if visible.is_empty() {
                out.push(format!(
                    "{}",
                    dim.apply_to("No descriptions match the current search.")
                ));
            } else {
                out.push(format!(
                    "{:>3}  {:<NAME_WIDTH$}  {:<DESCRIPTION_WIDTH$}  {:<16}  {}",
                    "#", "Product", "Description", "Generated", "Actions"
                ));
                for (index, item) in visible.iter().enumerate() {
                    out.push(render_row(index + 1, item, state.is_processing(&item.id)));
                }
            }
        }
    }

    if let Some(url) = &state.selected_image_preview_url {
        out.push(String::new());
        out.push(format!("Image preview: {url}"));
        out.push(format!("{}", dim.apply_to("(type `close` to dismiss)")));
    }

    out.join("\n")
}

fn render_row(position: usize, item: &PendingDescription, processing: bool) -> String {
    let generated = item
        .value
        .generated_at
        .map(|t| t.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| "-".to_string());
    let actions = if processing {
        "processing…"
    } else {
        "accept | reject"
    };
    format!(
        "{position:>3}  {:<NAME_WIDTH$}  {:<DESCRIPTION_WIDTH$}  {generated:<16}  {actions}",
        truncate(item.product_name(), NAME_WIDTH),
        truncate(&single_line(item.description_text()), DESCRIPTION_WIDTH),
    )
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// Conta chars, não bytes, para nunca cortar texto multibyte.
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// Resumo de uma linha da revisão concluída, mais o registro de auditoria em JSON no modo verbose.
pub fn print_record(record: &ReviewRecord, verbose: bool) {
    let style = match record.outcome {
        SagaOutcome::Completed => Style::new().green(),
        SagaOutcome::Refused => Style::new().yellow(),
        _ => Style::new().red(),
    };
    println!(
        "{} {} {} ({} ms)",
        style.apply_to(record.outcome),
        record.decision,
        record.item_id,
        record.duration_ms
    );
    if verbose {
        println!(
            "{}",
            serde_json::to_string_pretty(record).unwrap_or_default()
        );
    }
}
