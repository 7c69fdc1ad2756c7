// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use std::env;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sales_insights::{load_csv, AppConfig, SalesReport};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    init_logging();

    let cfg = AppConfig::load().unwrap_or_default();
    let report = build_report(&cfg)?;

    match args.get(1).map(String::as_str) {
        Some("summary") => print!("{}", report.summary()),
        Some("ask") => run_ask(&report, &args[2..]),
        Some(other) => {
            eprintln!("❌ Unknown command: {}", other);
            eprintln!("   Usage: sales-insights [summary | ask <question>]");
            std::process::exit(2);
        }
        // UI mode (default)
        None => run_ui_mode(report)?,
    }

    Ok(())
}

fn init_logging() {
    // Logs go to stderr at `warn` so `summary` output and the TUI stay clean
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_report(cfg: &AppConfig) -> Result<SalesReport> {
    let data_path = cfg.data_path_or_default();

    let transactions = load_csv(&data_path)
        .with_context(|| format!("Failed to load sales data from {}", data_path.display()))?;
    info!(count = transactions.len(), "transactions loaded");

    Ok(SalesReport::build(&transactions))
}

fn run_ask(report: &SalesReport, words: &[String]) {
    let question = words.join(" ");
    println!("🤖 {}", report.answer(&question));
}

#[cfg(feature = "tui")]
fn run_ui_mode(report: SalesReport) -> Result<()> {
    let mut app = ui::App::new(report);
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(report: SalesReport) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use: sales-insights summary");
    eprintln!("   Or web UI: cargo run --bin sales-server --features server");
    drop(report);
    std::process::exit(1);
}
