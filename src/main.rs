// Entry point and high-level CLI flow.
//
// - `render` prints the utilisation table for the reference date.
// - `export` writes the table as CSV and JSON plus a JSON summary.
// - Without a subcommand an interactive menu loads the dataset once and
//   regenerates the table as often as asked.
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use tracing::{error, info};
use utilisation_report::config::AppConfig;
use utilisation_report::error::{AppError, OutputError};
use utilisation_report::projector::{project_with_stats, ProjectionStats};
use utilisation_report::types::{DisplayRow, SourceRecord, TablePayload};
use utilisation_report::{loader, output, telemetry, util};

// Loaded records survive between menu selections; rows are recomputed on
// every generation because the reference date may have moved.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { data: None }));

struct AppState {
    data: Option<Vec<SourceRecord>>,
}

#[derive(Parser, Debug)]
#[command(
    name = "utilisation_report",
    about = "Render the workforce utilisation table from a people dataset",
    version
)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Args, Debug, Default)]
struct CommonArgs {
    /// Path to the JSON dataset (overrides UTILISATION_INPUT)
    #[arg(long, global = true)]
    input: Option<PathBuf>,
    /// Directory for exported files (overrides UTILISATION_OUTPUT_DIR)
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,
    /// Reference date (YYYY-MM-DD); defaults to today
    #[arg(long, global = true, value_parser = parse_date)]
    today: Option<NaiveDate>,
    /// Number of rows shown in the console table
    #[arg(long, global = true)]
    rows: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the utilisation table
    Render,
    /// Write utilisation_table.csv, utilisation_table.json and summary.json
    Export,
}

#[derive(Debug, Clone)]
struct Settings {
    input: PathBuf,
    output_dir: PathBuf,
    preview_rows: usize,
    today: Option<NaiveDate>,
}

impl Settings {
    fn resolve(config: AppConfig, args: CommonArgs) -> Self {
        Self {
            input: args.input.unwrap_or(config.input),
            output_dir: args.output_dir.unwrap_or(config.output_dir),
            preview_rows: args.rows.unwrap_or(config.preview_rows),
            today: args.today,
        }
    }

    fn reference_date(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    util::parse_date_safe(Some(value)).ok_or_else(|| format!("'{}' is not a YYYY-MM-DD date", value))
}

/// Read a single line after printing `prompt`. `None` on end of input.
fn read_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Returns `true` if the user chose `Y`, `false` on `N` or end of input.
fn prompt_back_to_menu() -> bool {
    loop {
        let Some(resp) = read_line("Back to Menu (Y/N): ") else {
            return false;
        };
        match resp.to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn print_table(rows: &[DisplayRow], stats: &ProjectionStats, settings: &Settings, today: NaiveDate) {
    output::preview_table(
        "Workforce Utilisation",
        Some(format!("Reference date {}", today.format("%Y-%m-%d")).as_str()),
        rows,
        settings.preview_rows,
    );
    println!(
        "{} people shown ({} employees, {} externals); net earnings last month: {} EUR\n",
        util::format_int(stats.rows),
        util::format_int(stats.employees),
        util::format_int(stats.externals),
        util::format_number(stats.total_net_earnings, 0)
    );
}

fn export(
    rows: &[DisplayRow],
    stats: &ProjectionStats,
    settings: &Settings,
    today: NaiveDate,
) -> Result<(), AppError> {
    std::fs::create_dir_all(&settings.output_dir).map_err(OutputError::from)?;
    let csv_path = settings.output_dir.join("utilisation_table.csv");
    let json_path = settings.output_dir.join("utilisation_table.json");
    let summary_path = settings.output_dir.join("summary.json");

    output::write_csv(&csv_path, rows)?;
    output::write_json(&json_path, &TablePayload::new(rows))?;
    output::write_json(&summary_path, &stats.summary(today))?;

    println!("Outputs saved:");
    for path in [&csv_path, &json_path, &summary_path] {
        println!("  {}", path.display());
    }
    println!();
    Ok(())
}

/// Menu option [1]: load the dataset and print load diagnostics.
fn handle_load(settings: &Settings) {
    match loader::load_records(&settings.input) {
        Ok((data, report)) => {
            println!(
                "Processing dataset... ({} records loaded: {} employees, {} externals)",
                util::format_int(report.total_records),
                util::format_int(report.employees),
                util::format_int(report.externals)
            );
            if report.inactive > 0 {
                println!("Note: {} inactive people will be hidden.", util::format_int(report.inactive));
            }
            if report.unknown_variant > 0 {
                println!(
                    "Note: {} records are neither employees nor externals and will be skipped.",
                    util::format_int(report.unknown_variant)
                );
            }
            println!();
            let mut state = APP_STATE.lock().unwrap_or_else(PoisonError::into_inner);
            state.data = Some(data);
        }
        Err(e) => {
            error!(error = %e, "load failed");
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

/// Menu option [2]: project, print and export the table.
fn handle_generate(settings: &Settings) {
    let today = settings.reference_date();
    let projected = {
        let state = APP_STATE.lock().unwrap_or_else(PoisonError::into_inner);
        state.data.as_deref().map(|data| project_with_stats(data, today))
    };
    let Some((rows, stats)) = projected else {
        println!("Error: No data loaded. Please load the file first (option 1).\n");
        return;
    };

    print_table(&rows, &stats, settings, today);
    if let Err(e) = export(&rows, &stats, settings, today) {
        error!(error = %e, "export failed");
        eprintln!("Write error: {}", e);
    }
}

fn interactive(settings: &Settings) {
    loop {
        println!("Workforce Utilisation:");
        println!("[1] Load the file");
        println!("[2] Generate Table\n");
        let Some(choice) = read_line("Enter choice: ") else {
            break;
        };
        match choice.as_str() {
            "1" => handle_load(settings),
            "2" => {
                println!();
                handle_generate(settings);
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => println!("Invalid choice. Please enter 1 or 2.\n"),
        }
    }
}

fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let settings = Settings::resolve(config, cli.common);
    info!(input = %settings.input.display(), "starting");

    match cli.command {
        None => interactive(&settings),
        Some(command) => {
            let today = settings.reference_date();
            let (records, _) = loader::load_records(&settings.input)?;
            let (rows, stats) = project_with_stats(&records, today);
            match command {
                Command::Render => print_table(&rows, &stats, &settings, today),
                Command::Export => export(&rows, &stats, &settings, today)?,
            }
        }
    }
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}
