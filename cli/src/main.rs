//! imba CLI - promotional-cycle workbook normalization
//!
//! Reads an Excel workbook, normalizes the configured sheets for a cycle and
//! writes one CSV per sheet.

use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use imba::render::{CsvOptions, JsonFormat};
use imba::{Cycle, MappingOutcome, ReadOptions, XlsxReader};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

/// Normalize promotional-cycle workbooks into fixed-schema CSV files
#[derive(Parser)]
#[command(
    name = "imba",
    version,
    about = "Normalize cycle workbooks into CSV",
    long_about = "imba - Natura & Avon cycle workbook processor.\n\n\
                  Reads the 'Geral' sheet of an .xlsx workbook and writes it as \
                  Nova_Imba_Geral_C<cycle>.csv with the fixed 16-column layout."
)]
struct Cli {
    /// Verbose logging (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a workbook and write one file per mapped sheet
    #[command(visible_alias = "p")]
    Process {
        /// Input workbook (.xlsx)
        input: PathBuf,

        /// Calendar year of the cycle
        #[arg(long, default_value_t = 2025, value_parser = clap::value_parser!(u16).range(2024..=2030))]
        year: u16,

        /// Cycle number within the year
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=20))]
        cycle: u8,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "csv")]
        format: OutputFormat,

        /// CSV field delimiter
        #[arg(long, default_value_t = ',')]
        delimiter: char,

        /// Prefix CSV files with a UTF-8 byte order mark
        #[arg(long)]
        bom: bool,

        /// Keep text such as "NA" or "#N/A" instead of treating it as missing
        #[arg(long)]
        keep_na_text: bool,

        /// Print to stdout instead of writing files
        #[arg(long)]
        stdout: bool,
    },

    /// List the sheets of a workbook
    Sheets {
        /// Input workbook (.xlsx)
        input: PathBuf,

        /// Print sheet names as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

/// Output format
#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Comma-separated values
    Csv,
    /// Pretty-printed JSON
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Process {
            input,
            year,
            cycle,
            output,
            format,
            delimiter,
            bom,
            keep_na_text,
            stdout,
        } => {
            let cycle = Cycle::new(year, cycle)?;
            tracing::debug!(input = %input.display(), %cycle, "processing workbook");
            let delimiter = u8::try_from(delimiter)
                .map_err(|_| format!("delimiter must be a single-byte character, got '{}'", delimiter))?;
            let csv_options = CsvOptions::new()
                .with_delimiter(delimiter)
                .with_utf8_bom(bom);

            let pb = create_spinner("Reading workbook...");
            let outcomes = with_spinner(&pb, |pb| {
                imba::detect_format_from_path(&input)?;
                let reader = XlsxReader::open(&input)?
                    .with_options(ReadOptions::new().with_missing_markers(!keep_na_text));

                pb.set_message(format!("Processing {}...", cycle));
                imba::process_workbook(&reader, &cycle, &imba::default_mappings())
            })?;

            if !stdout {
                fs::create_dir_all(&output)?;
            }

            for outcome in outcomes {
                match outcome {
                    MappingOutcome::Processed(sheet) => {
                        let (content, file_name) = match format {
                            OutputFormat::Csv => (
                                imba::render::to_csv(&sheet.table, &csv_options)?,
                                sheet.file_name.clone(),
                            ),
                            OutputFormat::Json => (
                                imba::render::to_json(&sheet.table, JsonFormat::Pretty)?.into_bytes(),
                                Path::new(&sheet.file_name)
                                    .with_extension("json")
                                    .to_string_lossy()
                                    .into_owned(),
                            ),
                        };

                        if stdout {
                            let mut handle = io::stdout().lock();
                            handle.write_all(&content)?;
                            handle.flush()?;
                        } else {
                            let path = output.join(&file_name);
                            fs::write(&path, &content)?;
                            tracing::debug!(path = %path.display(), bytes = content.len(), "wrote output");
                            println!(
                                "{} {} ({} rows from sheet '{}'): {}",
                                "✓".green().bold(),
                                sheet.key,
                                sheet.table.row_count(),
                                sheet.sheet_name,
                                path.display()
                            );
                        }
                    }
                    MappingOutcome::MissingSheet { key } => {
                        eprintln!(
                            "{} Sheet '{}' not found in {}",
                            "!".yellow().bold(),
                            key,
                            input.display()
                        );
                    }
                }
            }
        }

        Commands::Sheets { input, json } => {
            let format = imba::detect_format_from_path(&input)?;
            let reader = XlsxReader::open(&input)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&reader.sheet_names())?);
                return Ok(());
            }

            println!("{}", "Workbook Information".cyan().bold());
            println!("{}", "─".repeat(40));
            println!(
                "{}: {}",
                "File".bold(),
                input.file_name().unwrap_or_default().to_string_lossy()
            );
            println!("{}: {} (.{})", "Format".bold(), format, format.extension());
            println!("{}: {}", "Sheets".bold(), reader.sheet_count());
            for sheet in reader.sheets() {
                if sheet.hidden {
                    println!("  {} {}", sheet.name, "(hidden)".dimmed());
                } else {
                    println!("  {}", sheet.name);
                }
            }
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

fn print_version() {
    println!("{} {}", "imba".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Promotional-cycle workbook normalization to CSV");
    println!();
    println!("Supported formats: XLSX, XLSM");
}

/// Run `f` while the spinner ticks; the spinner is cleared whether or not `f` fails.
fn with_spinner<T>(
    pb: &ProgressBar,
    f: impl FnOnce(&ProgressBar) -> imba::Result<T>,
) -> imba::Result<T> {
    let result = f(pb);
    pb.finish_and_clear();
    result
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template("{spinner:.blue} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_process_args() {
        let cli = Cli::try_parse_from([
            "imba", "process", "in.xlsx", "--year", "2026", "--cycle", "12", "-o", "out",
        ])
        .unwrap();
        match cli.command {
            Commands::Process {
                year, cycle, output, ..
            } => {
                assert_eq!(year, 2026);
                assert_eq!(cycle, 12);
                assert_eq!(output, PathBuf::from("out"));
            }
            _ => panic!("expected process"),
        }
    }

    #[test]
    fn test_spinner_cleared_on_error() {
        let pb = ProgressBar::hidden();
        let result: imba::Result<()> = with_spinner(&pb, |_| {
            imba::detect_format_from_path("does-not-exist.xlsx")?;
            Ok(())
        });
        assert!(matches!(result, Err(imba::Error::Io(_))));
        assert!(pb.is_finished());
    }

    #[test]
    fn test_spinner_cleared_on_success() {
        let pb = ProgressBar::hidden();
        let value = with_spinner(&pb, |pb| {
            pb.set_message("working");
            Ok(3)
        })
        .unwrap();
        assert_eq!(value, 3);
        assert!(pb.is_finished());
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(Cli::try_parse_from(["imba", "process", "in.xlsx", "--cycle", "21"]).is_err());
        assert!(Cli::try_parse_from(["imba", "process", "in.xlsx", "--year", "2023"]).is_err());
    }
}
