//! kpidash - Employee KPI dashboard
//!
//! A CLI tool that reads a KPI spreadsheet, rates every employee and
//! renders table, leaderboard and distribution views as Markdown, JSON
//! or HTML.
//!
//! Exit codes:
//!   0 - Success, or no input provided
//!   1 - Error (missing columns, unreadable workbook, bad arguments, etc.)

mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod report;
mod watch;
mod workbook;

use anyhow::{Context, Result};
use cli::Args;
use config::Config;
use models::{Dashboard, EmployeeFilter, Selection};
use report::ReportOptions;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    let mut config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(log_level(&args, &config));

    info!("kpidash v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args, config).await {
        error!("Dashboard failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .kpidash.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(config::CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!("⚠️  .kpidash.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .kpidash.toml")?;

    println!("✅ Created .kpidash.toml with default settings.");
    println!("   Edit it to customize column aliases, score policy, and report layout.");
    Ok(())
}

fn log_level(args: &Args, config: &Config) -> tracing::Level {
    if !args.quiet && config.general.verbose {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    }
}

/// Initialize logging. `RUST_LOG` takes precedence over the CLI verbosity.
fn init_logging(level: tracing::Level) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("⚠️  Ignoring {}: {:#}", config::CONFIG_FILE_NAME, e);
            Ok(Config::default())
        }
    }
}

/// Run one pass, the employee listing, or the watch loop.
async fn run(args: Args, config: Config) -> Result<()> {
    let Some(input) = args.input.clone() else {
        print_idle_prompt();
        return Ok(());
    };

    let selection = Selection {
        employee: EmployeeFilter::parse(&args.employee),
        rating: args.rating.parse()?,
    };

    if args.list_employees {
        return list_employees(&input, &config);
    }

    if args.watch {
        let interval = Duration::from_millis(config.watch.interval_ms);
        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
        };

        let renders = watch::watch(&input, interval, !args.quiet, shutdown, |path| {
            render_once(path, &selection, &config, args.quiet)
        })
        .await?;

        info!("Watch stopped after {} render(s)", renders);
        return Ok(());
    }

    render_once(&input, &selection, &config, args.quiet)
}

/// The "no file provided" state: explain what to do, compute nothing.
fn print_idle_prompt() {
    println!("📊 kpidash");
    println!("⬆️  Provide a KPI workbook (.xlsx) with --input <FILE> to build the dashboard.");
    println!("   The first sheet needs full name, role and composite score columns.");
}

/// Read, classify and filter the workbook at `input`.
fn load_dashboard(input: &Path, selection: &Selection, config: &Config) -> Result<Dashboard> {
    let raw = workbook::load_first_sheet(input)?;
    let table = analysis::classify(&raw, &config.columns, config.scoring.policy)?;
    let dashboard = analysis::build_dashboard(
        &table,
        selection,
        config.report.top_n,
        &input.display().to_string(),
    )?;

    Ok(dashboard)
}

/// Run the full classify, filter, aggregate and render pipeline once.
///
/// Nothing is written unless every step succeeds.
fn render_once(input: &Path, selection: &Selection, config: &Config, quiet: bool) -> Result<()> {
    let start_time = Instant::now();

    let dashboard = load_dashboard(input, selection, config)?;

    let options = ReportOptions {
        title: config.report.title.clone(),
        locale: config.report.locale,
    };
    let output = report::render(&dashboard, config.report.format, &options)?;

    let Some(ref output_path) = config.general.output else {
        print!("{}", output);
        return Ok(());
    };

    std::fs::write(output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    if !quiet {
        print_summary(&dashboard, start_time.elapsed());
        println!("\n✅ Dashboard saved to: {}", output_path.display());
    }

    Ok(())
}

fn print_summary(dashboard: &Dashboard, elapsed: Duration) {
    let summary = &dashboard.summary;

    println!("\n📊 KPI Summary:");
    println!("   Employees: {}", summary.employee_count);
    println!("   Mean KPI: {}", summary.mean_display());
    println!("   Excellent share: {}", summary.excellent_share_display());
    let bands: Vec<String> = dashboard
        .distribution
        .iter()
        .map(|band| format!("{} {}: {}", band.rating.emoji(), band.rating, band.count))
        .collect();
    if !bands.is_empty() {
        println!("   {}", bands.join(" | "));
    }
    if !dashboard.skipped.is_empty() {
        println!("   Skipped rows: {}", dashboard.skipped.len());
    }
    println!("   Duration: {:.2}s", elapsed.as_secs_f64());
}

/// Handle --list-employees: print the names accepted by --employee.
fn list_employees(input: &Path, config: &Config) -> Result<()> {
    let raw = workbook::load_first_sheet(input)?;
    let table = analysis::classify(&raw, &config.columns, config.scoring.policy)?;

    for name in analysis::unique_names(&table.records) {
        println!("{}", name);
    }

    Ok(())
}
