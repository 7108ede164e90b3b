//! dashboard: terminal dashboard for community-bank disbursements.
//!
//! Usage:
//!   dashboard --data bancos_com_dados.xlsx --sheet "DADOS REAIS"
//!   dashboard --config dashboard.json --seed 42
//!   dashboard --summary          (print KPIs and chart tables, no TUI)
//!   dashboard --json             (print the full view as JSON, no TUI)

mod tui;

use anyhow::Result;
use desembolso_core::{
    charts::series_names, dashboard::DashboardView, Dashboard, DashboardConfig, DataStatus,
};
use std::env;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let summary_mode = args.iter().any(|a| a == "--summary");
    let json_mode = args.iter().any(|a| a == "--json");
    let headless = summary_mode || json_mode;

    // The TUI owns the screen, so logging stays quiet unless asked for.
    let default_filter = if headless { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = build_config(&args)?;
    log::info!(
        "data: {}  sheet: {}  seed: {:?}",
        config.data_path,
        config.sheet_name,
        config.jitter_seed
    );

    let mut dashboard = Dashboard::new(config);

    if json_mode {
        let view = dashboard.view();
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else if summary_mode {
        let view = dashboard.view();
        print_summary(&view);
    } else {
        tui::run_tui(dashboard)?;
    }

    Ok(())
}

/// Config file first, then command-line overrides.
fn build_config(args: &[String]) -> Result<DashboardConfig> {
    let mut config = match arg_value(args, "--config") {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };
    if let Some(data) = arg_value(args, "--data") {
        config.data_path = data.to_string();
    }
    if let Some(sheet) = arg_value(args, "--sheet") {
        config.sheet_name = sheet.to_string();
    }
    if let Some(seed) = parse_arg::<u64>(args, "--seed") {
        config.jitter_seed = Some(seed);
    }
    Ok(config)
}

fn print_summary(view: &DashboardView) {
    println!("=== {} ===", view.title);
    match &view.status {
        DataStatus::Loaded { records } => println!("  records loaded: {records}"),
        DataStatus::LoadFailed { message } => {
            println!("  Ocorreu um erro crítico ao carregar os dados: {message}");
            return;
        }
    }
    if let Some((start, end)) = view.bounds {
        println!("  period:         {start} .. {end}");
    }
    println!("  filtered rows:  {}", view.row_count);

    println!();
    println!("=== KPIs ===");
    for card in &view.cards {
        println!("  {:<32} {}", card.label, card.value);
    }

    println!();
    println!("=== Crédito por Banco Comunitário ===");
    if view.credit_by_bank.is_empty() {
        println!("  (Sem dados para exibir.)");
    }
    for bar in view.credit_by_bank.iter().rev() {
        println!("  {:<32} {}", bar.bank, bar.label());
    }

    println!();
    println!("=== Fundo Gerado no Período | Por Moeda ===");
    if view.monthly.is_empty() {
        println!("  (Sem dados para exibir.)");
    }
    let series = series_names(&view.monthly);
    for bucket in &view.monthly {
        println!("  {} | total R$ {:.2}", bucket.label, bucket.total());
        for name in &series {
            if let Some((_, value)) = bucket.by_bank.iter().find(|(bank, _)| bank == name) {
                println!("      {name:<28} R$ {value:.2}");
            }
        }
    }
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    arg_value(args, flag).and_then(|v| v.parse().ok())
}
