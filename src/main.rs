//! sheetsite CLI - turn a site workbook into schema files and sitemaps.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use sheetsite::{
    ClientRunOutcome, ClientSitemapBuilder, HandoffOutcome, ProfileBuilder, SheetOutcome,
    SheetSiteError, SheetTable, SitemapBuilder, TransformerBuilder, DEFAULT_SITE_URL_SHEET,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// sheetsite - spreadsheet content to JSON/YAML schema files and sitemaps.
#[derive(Parser)]
#[command(
    name = "sheetsite",
    version,
    about = "Convert a site workbook into JSON/YAML schema files and publish them through sitemaps.",
    long_about = None,
)]
struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Write schema-files/<category>/<stem>.{json,yaml} for every configured sheet.
    Transform {
        /// Input workbook (.xlsx).
        #[arg(short, long)]
        input: PathBuf,

        /// Output root directory.
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// JSON file with the sheet table (defaults to the built-in table).
        #[arg(long)]
        sheet_config: Option<PathBuf>,

        /// Sheet whose `website` field becomes the site URL.
        #[arg(long, default_value = DEFAULT_SITE_URL_SHEET)]
        site_url_sheet: String,

        /// Site URL used when the workbook has no `website` field.
        #[arg(long, env = "SITE_BASE_URL")]
        fallback_url: Option<String>,
    },

    /// Write ai-sitemap.xml listing every JSON/YAML file under schema-files.
    Sitemap {
        /// Root directory containing schema-files.
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Output file (relative paths resolve against the root).
        #[arg(short, long, default_value = "ai-sitemap.xml")]
        output: PathBuf,

        /// Site URL used when no handoff file exists.
        #[arg(long, env = "SITE_BASE_URL")]
        fallback_url: Option<String>,
    },

    /// Write main-data, licenses and services-list from a single-client workbook.
    Profile {
        /// Workbook whose first sheet holds a header row and one client row.
        #[arg(short, long, default_value = "data/client-data.xlsx")]
        input: PathBuf,

        /// Output root directory.
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },

    /// Write one sitemap per row of a client workbook, plus a run report.
    ClientSitemaps {
        /// Client workbook (.xlsx).
        #[arg(short, long)]
        input: PathBuf,

        /// Root directory the listed files are resolved against.
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Output directory for sitemaps and report.txt (relative to the root).
        #[arg(long, default_value = "client-sitemaps")]
        out_dir: PathBuf,
    },
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = match cli.verbose {
        0 => "sheetsite=info",
        1 => "sheetsite=debug",
        _ => "sheetsite=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    let result = match cli.command {
        Command::Transform {
            input,
            root,
            sheet_config,
            site_url_sheet,
            fallback_url,
        } => run_transform(&input, root, sheet_config.as_deref(), site_url_sheet, fallback_url),
        Command::Sitemap {
            root,
            output,
            fallback_url,
        } => run_sitemap(root, output, fallback_url),
        Command::Profile { input, root } => run_profile(&input, root),
        Command::ClientSitemaps {
            input,
            root,
            out_dir,
        } => run_client_sitemaps(&input, root, out_dir),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_transform(
    input: &Path,
    root: PathBuf,
    sheet_config: Option<&Path>,
    site_url_sheet: String,
    fallback_url: Option<String>,
) -> Result<(), SheetSiteError> {
    let sheets = match sheet_config {
        Some(path) => SheetTable::from_json_file(path)?,
        None => SheetTable::default(),
    };

    let transformer = TransformerBuilder::new()
        .with_sheet_table(sheets)
        .with_root(root)
        .with_site_url_sheet(site_url_sheet)
        .with_fallback_url(fallback_url)
        .build()?;

    let report = transformer.transform_path(input)?;

    for sheet in &report.sheets {
        match &sheet.outcome {
            SheetOutcome::Failed { failures, .. } => {
                for failure in failures {
                    warn!(
                        sheet = %sheet.sheet,
                        path = %failure.path.display(),
                        "{} not written: {}",
                        failure.format,
                        failure.message
                    );
                }
            }
            SheetOutcome::Unreadable { message } => {
                warn!(sheet = %sheet.sheet, "sheet not read: {}", message);
            }
            SheetOutcome::Missing | SheetOutcome::Written { .. } => {}
        }
    }
    if let HandoffOutcome::Failed { url, message } = &report.handoff {
        warn!(url = %url, "site URL not saved: {}", message);
    }

    info!(
        written = report.written_count(),
        missing = report.missing_count(),
        failed = report.failed_count(),
        "transform finished"
    );
    Ok(())
}

fn run_sitemap(
    root: PathBuf,
    output: PathBuf,
    fallback_url: Option<String>,
) -> Result<(), SheetSiteError> {
    SitemapBuilder::new()
        .with_root(root)
        .with_output(output)
        .with_fallback_url(fallback_url)
        .build()?
        .assemble()?;
    Ok(())
}

fn run_profile(input: &Path, root: PathBuf) -> Result<(), SheetSiteError> {
    let report = ProfileBuilder::new()
        .with_root(root)
        .build()?
        .generate_path(input)?;

    for output in &report.outputs {
        if let SheetOutcome::Failed { failures, .. } = &output.outcome {
            for failure in failures {
                warn!(
                    path = %failure.path.display(),
                    "{} not written: {}",
                    failure.format,
                    failure.message
                );
            }
        }
    }
    Ok(())
}

fn run_client_sitemaps(input: &Path, root: PathBuf, out_dir: PathBuf) -> Result<(), SheetSiteError> {
    let assembler = ClientSitemapBuilder::new()
        .with_root(root)
        .with_out_dir(out_dir)
        .build()?;

    match assembler.run(input) {
        ClientRunOutcome::Completed { .. } => Ok(()),
        ClientRunOutcome::Failed { error, .. } => Err(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_transform_defaults() {
        let cli = Cli::try_parse_from(["sheetsite", "transform", "--input", "site.xlsx"]).unwrap();
        match cli.command {
            Command::Transform {
                input,
                root,
                sheet_config,
                site_url_sheet,
                ..
            } => {
                assert_eq!(input, PathBuf::from("site.xlsx"));
                assert_eq!(root, PathBuf::from("."));
                assert!(sheet_config.is_none());
                assert_eq!(site_url_sheet, "core_info");
            }
            _ => panic!("Expected transform command"),
        }
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "sheetsite",
            "client-sitemaps",
            "-i",
            "clients.xlsx",
            "-vv",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.log_format, LogFormat::Json));
        assert!(matches!(cli.command, Command::ClientSitemaps { .. }));
    }

    #[test]
    fn test_parse_profile_defaults() {
        let cli = Cli::try_parse_from(["sheetsite", "profile"]).unwrap();
        match cli.command {
            Command::Profile { input, root } => {
                assert_eq!(input, PathBuf::from("data/client-data.xlsx"));
                assert_eq!(root, PathBuf::from("."));
            }
            _ => panic!("Expected profile command"),
        }
    }

    #[test]
    fn test_transform_requires_input() {
        assert!(Cli::try_parse_from(["sheetsite", "transform"]).is_err());
    }
}
