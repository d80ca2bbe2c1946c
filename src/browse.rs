//! Interactive student list driven from a line-oriented terminal.
//!
//! Keystrokes in a browser become whole lines here, but the flow is the
//! same: each command updates the list controller, immediate fetches are
//! spawned right away, search fetches wait for the debounce timer, and
//! every response goes back through the controller's generation check.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::client::Gateway;
use crate::export;
use crate::models::RiskFilter;
use crate::risk;
use crate::students::{fetch_page, ListOutcome, ListRequest, StudentListController};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Search(String),
    Clear,
    Filter(RiskFilter),
    Next,
    Prev,
    Page(u32),
    Export(Option<PathBuf>),
    Help,
    Quit,
}

pub const HELP: &str = "commands: search <text> | clear | filter <all|low|medium|high> | \
next | prev | page <n> | export [dir] | help | quit";

impl BrowseCommand {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_ascii_lowercase().as_str() {
            "search" | "s" if rest.is_empty() => Ok(BrowseCommand::Clear),
            "search" | "s" => Ok(BrowseCommand::Search(rest.to_string())),
            "clear" => Ok(BrowseCommand::Clear),
            "filter" | "f" => rest
                .parse()
                .map(BrowseCommand::Filter)
                .map_err(|err| format!("{err}")),
            "next" | "n" => Ok(BrowseCommand::Next),
            "prev" | "p" => Ok(BrowseCommand::Prev),
            "page" => rest
                .parse()
                .map(BrowseCommand::Page)
                .map_err(|_| format!("not a page number: `{rest}`")),
            "export" | "e" => Ok(BrowseCommand::Export(
                Some(rest).filter(|r| !r.is_empty()).map(PathBuf::from),
            )),
            "help" | "?" | "" => Ok(BrowseCommand::Help),
            "quit" | "q" | "exit" => Ok(BrowseCommand::Quit),
            other => Err(format!("unknown command `{other}`; {HELP}")),
        }
    }
}

/// Apply a list command. Returns the fetch to dispatch now, if any.
pub fn apply(
    controller: &mut StudentListController,
    command: &BrowseCommand,
    now: Instant,
) -> Option<ListRequest> {
    match command {
        BrowseCommand::Search(text) => controller.set_search(text.clone(), now),
        BrowseCommand::Clear => controller.set_search(String::new(), now),
        BrowseCommand::Filter(filter) => controller.set_risk_filter(*filter),
        BrowseCommand::Next => controller.next_page(),
        BrowseCommand::Prev => controller.prev_page(),
        BrowseCommand::Page(page) => controller.go_to_page(*page),
        BrowseCommand::Export(_) | BrowseCommand::Help | BrowseCommand::Quit => None,
    }
}

pub fn render(controller: &StudentListController) -> String {
    let mut output = String::new();
    let stats = controller.stats();

    let _ = writeln!(
        output,
        "Total {} | Alto Riesgo {} | Riesgo Moderado {} | Bajo Riesgo {}",
        stats.total, stats.high_risk, stats.medium_risk, stats.low_risk
    );
    let _ = writeln!(
        output,
        "Filtro: {} | Búsqueda: {}",
        risk::filter_label(controller.risk_filter()),
        if controller.search().is_empty() {
            "-"
        } else {
            controller.search()
        }
    );

    if let Some(error) = controller.error() {
        let _ = writeln!(output, "! {error}");
    }

    if controller.students().is_empty() {
        let _ = writeln!(output, "No hay estudiantes que coincidan con los filtros.");
    } else {
        let _ = writeln!(
            output,
            "{:<8} {:<2} {:>4} {:<10} {:>5} {:>6} {:>7}  {}",
            "ID", "G", "Edad", "Programa", "CGPA", "Presión", "Prob.", "Nivel"
        );
        for s in controller.students() {
            let _ = writeln!(
                output,
                "{:<8} {:<2} {:>4} {:<10} {:>5} {:>6} {:>7}  {}",
                s.id,
                risk::gender_initial(&s.gender),
                s.age,
                s.degree,
                s.cgpa,
                format!("{}/5", s.academic_pressure),
                format!("{}%", s.probability),
                risk::list_badge(s.risk_level)
            );
        }
    }

    let controls = controller.controls();
    if controls.visible {
        let _ = writeln!(
            output,
            "Página {} de {} ({} registros){}{}",
            controls.page,
            controls.total_pages,
            controls.total_records,
            if controls.prev_enabled { "  [prev]" } else { "" },
            if controls.next_enabled { "  [next]" } else { "" },
        );
    }

    output
}

fn export_current(
    controller: &StudentListController,
    dir: &Path,
) -> anyhow::Result<Option<PathBuf>> {
    let today = Utc::now().date_naive();
    match export::export_page(controller.data(), today)? {
        Some(file) => file.write_to(dir).map(Some),
        None => Ok(None),
    }
}

fn dispatch<G>(gateway: &G, tx: &mpsc::UnboundedSender<ListOutcome>, request: ListRequest)
where
    G: Gateway + Clone + 'static,
{
    let gateway = gateway.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let outcome = fetch_page(&gateway, request).await;
        // The receiver is gone once browsing ends; nothing left to update.
        let _ = tx.send(outcome);
    });
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Run the browse loop until `quit` or end of input.
pub async fn run<G, R>(gateway: G, input: R) -> anyhow::Result<()>
where
    G: Gateway + Clone + 'static,
    R: AsyncBufRead + Unpin,
{
    let mut controller = StudentListController::default();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut lines = input.lines();

    println!("{HELP}");
    dispatch(&gateway, &tx, controller.load());

    loop {
        let deadline = controller.debounce_deadline();

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let command = match BrowseCommand::parse(&line) {
                    Ok(command) => command,
                    Err(message) => {
                        println!("{message}");
                        continue;
                    }
                };

                match &command {
                    BrowseCommand::Quit => break,
                    BrowseCommand::Help => println!("{HELP}"),
                    BrowseCommand::Export(dir) => {
                        let dir = dir.clone().unwrap_or_else(|| PathBuf::from("."));
                        match export_current(&controller, &dir) {
                            Ok(Some(path)) => println!("Exportado a {}", path.display()),
                            Ok(None) => println!("Nada que exportar."),
                            Err(err) => {
                                tracing::warn!(error = %err, "export failed");
                                println!("! {err:#}");
                            }
                        }
                    }
                    _ => {
                        if let Some(request) = apply(&mut controller, &command, Instant::now()) {
                            dispatch(&gateway, &tx, request);
                        }
                    }
                }
            }
            Some(outcome) = rx.recv() => {
                if controller.complete(outcome) {
                    print!("{}", render(&controller));
                }
            }
            _ = wait_until(deadline) => {
                if let Some(request) = controller.poll_debounce(Instant::now()) {
                    dispatch(&gateway, &tx, request);
                }
            }
        }
    }

    controller.unmount();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debounce::Debouncer;
    use crate::models::{RiskLevel, StudentsResponse};
    use crate::testing::{sample_page, sample_record, FakeGateway};
    use std::time::Duration;
    use tokio::io::{duplex, AsyncWriteExt, BufReader};
    use tokio::time::sleep;

    fn loaded(page: StudentsResponse) -> StudentListController {
        let mut controller = StudentListController::default();
        let request = controller.load();
        controller.complete(ListOutcome {
            generation: request.generation,
            result: Ok(page),
        });
        controller
    }

    #[test]
    fn parses_commands() {
        assert_eq!(
            BrowseCommand::parse("search 1042"),
            Ok(BrowseCommand::Search("1042".to_string()))
        );
        assert_eq!(BrowseCommand::parse("search"), Ok(BrowseCommand::Clear));
        assert_eq!(
            BrowseCommand::parse("filter High"),
            Ok(BrowseCommand::Filter(RiskFilter::High))
        );
        assert_eq!(BrowseCommand::parse(" page 3 "), Ok(BrowseCommand::Page(3)));
        assert_eq!(BrowseCommand::parse("export"), Ok(BrowseCommand::Export(None)));
        assert_eq!(
            BrowseCommand::parse("export /tmp/out"),
            Ok(BrowseCommand::Export(Some(PathBuf::from("/tmp/out"))))
        );
        assert_eq!(BrowseCommand::parse("q"), Ok(BrowseCommand::Quit));
        assert!(BrowseCommand::parse("filter severe").is_err());
        assert!(BrowseCommand::parse("page x").is_err());
        assert!(BrowseCommand::parse("dance").is_err());
    }

    #[test]
    fn search_waits_for_timer_while_filter_fetches_now() {
        let now = Instant::now();
        let mut controller = StudentListController::default();
        assert!(apply(&mut controller, &BrowseCommand::Search("7".into()), now).is_none());
        let request = apply(&mut controller, &BrowseCommand::Filter(RiskFilter::Low), now).unwrap();
        assert_eq!(request.query.search.as_deref(), Some("7"));
        assert!(apply(&mut controller, &BrowseCommand::Help, now).is_none());
    }

    #[test]
    fn render_shows_stats_rows_and_pagination() {
        let controller = loaded(sample_page(
            1,
            3,
            vec![
                sample_record("1001", RiskLevel::High),
                sample_record("1002", RiskLevel::Low),
            ],
        ));
        let text = render(&controller);

        assert!(text.starts_with("Total 2 | Alto Riesgo 1 | Riesgo Moderado 0 | Bajo Riesgo 1\n"));
        assert!(text.contains("Filtro: Todos | Búsqueda: -"));
        assert!(text.contains("1001"));
        assert!(text.contains("82%"));
        assert!(text.contains(" 7.25 "));
        assert!(text.contains("Alto Riesgo\n"));
        assert!(text.contains("Página 1 de 3 (2 registros)  [next]"));
        assert!(!text.contains("[prev]"));
    }

    #[test]
    fn render_empty_state() {
        let controller = loaded(sample_page(1, 1, vec![]));
        let text = render(&controller);
        assert!(text.contains("No hay estudiantes que coincidan con los filtros."));
        assert!(!text.contains("Página"));
    }

    #[tokio::test(start_paused = true)]
    async fn typed_search_fetches_once_and_clear_fetches_now() {
        let gateway = FakeGateway::default();
        for _ in 0..3 {
            gateway.push_page(Ok(sample_page(
                1,
                1,
                vec![sample_record("1001", RiskLevel::Low)],
            )));
        }
        let log = gateway.clone();
        let quiet = Debouncer::default().quiet_period();
        let step = quiet / 4;
        let (reader, mut writer) = duplex(256);

        let typing = async move {
            sleep(step).await;
            assert_eq!(log.list_calls().len(), 1);

            for text in ["1", "10", "104"] {
                writer
                    .write_all(format!("search {text}\n").as_bytes())
                    .await
                    .unwrap();
                sleep(step).await;
            }
            assert_eq!(log.list_calls().len(), 1);

            sleep(quiet).await;
            let calls = log.list_calls();
            assert_eq!(calls.len(), 2);
            assert_eq!(calls[1].search.as_deref(), Some("104"));
            assert_eq!(calls[1].page, Some(1));

            writer.write_all(b"clear\n").await.unwrap();
            sleep(Duration::from_millis(1)).await;
            let calls = log.list_calls();
            assert_eq!(calls.len(), 3);
            assert_eq!(calls[2].search, None);
        };

        let (result, ()) = tokio::join!(run(gateway, BufReader::new(reader)), typing);
        result.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn failed_export_keeps_browsing() {
        let gateway = FakeGateway::default();
        gateway.push_page(Ok(sample_page(
            1,
            1,
            vec![sample_record("1001", RiskLevel::High)],
        )));
        gateway.push_page(Ok(sample_page(1, 1, vec![])));
        let log = gateway.clone();
        // A regular file cannot hold the export.
        let not_a_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml");
        let (reader, mut writer) = duplex(256);

        let session = async move {
            sleep(Duration::from_millis(10)).await;
            writer
                .write_all(format!("export {}\n", not_a_dir.display()).as_bytes())
                .await
                .unwrap();
            sleep(Duration::from_millis(10)).await;

            writer.write_all(b"filter high\n").await.unwrap();
            sleep(Duration::from_millis(10)).await;
            let calls = log.list_calls();
            assert_eq!(calls.len(), 2);
            assert_eq!(calls[1].risk_filter, Some(RiskFilter::High));

            writer.write_all(b"quit\n").await.unwrap();
        };

        let (result, ()) = tokio::join!(run(gateway, BufReader::new(reader)), session);
        result.unwrap();
    }
}
