use anyhow::Result;
use outreach_tracker::cli::{self, Command};
use outreach_tracker::collab::calendar::CalendarLinkScheduler;
use outreach_tracker::collab::openai::OpenAiEnricher;
use outreach_tracker::config::Config;
use outreach_tracker::pipeline::{AdvanceOutcome, PipelineEngine, PipelineEvent, ViewState};
use outreach_tracker::rows;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Value following `flag` on the command line, if present.
fn arg_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn print_prompt(view: &ViewState) {
    print!("  [{} / {}] > ", view.day, view.stage);
    let _ = std::io::stdout().flush();
}

fn print_view(engine: &PipelineEngine, view: &ViewState) {
    let visible = view.visible(engine);
    println!("  {} · {} ({} contacts)", view.day, view.stage, visible.len());
    for (i, c) in visible.iter().enumerate() {
        println!("{}", cli::format_row(i + 1, c));
    }
}

fn import_file(engine: &mut PipelineEngine, path: &Path) {
    match rows::read_rows(path) {
        Ok(rows) => {
            let added = engine.import_contacts(&rows);
            println!("  Imported {} contacts ({} total)", added.len(), engine.len());
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %format!("{:#}", e), "import failed");
            println!("  Import failed: {:#}", e);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config_path = arg_value(&args, "--config").unwrap_or_else(|| "config.toml".to_string());
    let config = Config::load_or_default(Path::new(&config_path))?;

    let log_file = std::fs::File::create(&config.log.file)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.filter)),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .init();

    let no_open = args.iter().any(|a| a == "--no-open");

    // Load saved keys from .env (real env vars take precedence)
    Config::load_env_file();

    println!();
    println!("  Outreach Tracker v0.1.0");
    println!("  =======================");
    println!();

    // Without a key the tracker still runs; only `enrich` reports the error.
    let openai_key = match Config::openai_api_key() {
        Ok(key) => Some(key),
        Err(e) => {
            tracing::warn!(error = %format!("{:#}", e), "no OpenAI key, enrichment disabled");
            println!("  No OpenAI key ({:#}); enrichment disabled.", e);
            None
        }
    };

    let scheduler = Arc::new(
        CalendarLinkScheduler::new(&config.calendar)
            .with_browser(config.calendar.open_browser && !no_open),
    );
    let enricher = OpenAiEnricher::new(openai_key, &config.enricher)?;

    let (event_tx, mut event_rx) = mpsc::channel::<PipelineEvent>(16);
    let mut engine =
        PipelineEngine::new(scheduler.clone(), Arc::new(enricher)).with_events(event_tx);
    let mut view = ViewState::default();

    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event {
                PipelineEvent::StageCleared { stage } => {
                    println!("  *** Every contact in {} has been attempted! ***", stage);
                }
            }
        }
    });

    if let Some(path) = arg_value(&args, "--import") {
        import_file(&mut engine, &PathBuf::from(path));
    }

    println!("  Type 'help' for commands.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print_prompt(&view);
        let Some(line) = lines.next_line().await? else { break };
        if line.trim().is_empty() {
            continue;
        }

        let cmd = match Command::parse(&line) {
            Ok(cmd) => cmd,
            Err(e) => {
                println!("  {}", e);
                continue;
            }
        };

        match cmd {
            Command::Quit => break,
            Command::Help => println!("{}", cli::HELP),
            Command::List => print_view(&engine, &view),
            Command::Import(path) => import_file(&mut engine, &path),
            Command::SelectStage(stage) => {
                view.stage = stage;
                print_view(&engine, &view);
            }
            Command::SelectDay(day) => {
                view.day = day;
                print_view(&engine, &view);
            }
            Command::Show(target) => match cli::resolve_target(&engine, &view, &target)
                .and_then(|id| engine.get(id))
            {
                Some(c) => println!("{}", cli::format_detail(c)),
                None => println!("  No such contact: {}", target),
            },
            Command::Advance(target) => {
                let Some(id) = cli::resolve_target(&engine, &view, &target) else {
                    println!("  No such contact: {}", target);
                    continue;
                };
                match engine.advance(id).await {
                    AdvanceOutcome::Advanced(t) => {
                        println!(
                            "  {} moved {} -> {}",
                            t.contact.entity_name, t.from, t.contact.stage
                        );
                        if !t.reminder_scheduled {
                            println!("  (calendar reminder could not be created, see log)");
                        } else if !scheduler.opens_browser() {
                            if let Some(link) = scheduler.last_link() {
                                println!("  Calendar: {}", link);
                            }
                        }
                    }
                    AdvanceOutcome::Terminal => println!("  Already at the final stage"),
                    AdvanceOutcome::NotFound => println!("  No such contact: {}", target),
                }
                // Let the event listener print before the next prompt
                tokio::task::yield_now().await;
            }
            Command::Enrich(target) => {
                let Some(id) = cli::resolve_target(&engine, &view, &target) else {
                    println!("  No such contact: {}", target);
                    continue;
                };
                println!("  Generating insights...");
                match engine.enrich(id).await {
                    Ok(Some(c)) => println!("{}", cli::format_detail(&c)),
                    Ok(None) => println!("  No such contact: {}", target),
                    Err(e) => println!("  Enrichment failed: {:#}", e),
                }
            }
        }
    }

    println!("  Bye.");
    Ok(())
}
