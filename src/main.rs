use clap::{Parser, Subcommand};
use colored::Colorize;
use rosterbook::cli::{self, CallerContext};
use rosterbook::error::RosterResult;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rosterbook")]
#[command(about = "Bulk roster exchange between spreadsheets and the reporting store")]
#[command(long_about = "Rosterbook - spreadsheet roster import/export

Imports human-maintained roster workbooks into the institutional reporting
store as one batched submission, and exports stored records back into the
pre-formatted reporting template.

COMMANDS:
  import   - Workbook (.xlsx) → batched record submission
  export   - Stored records → reporting template (.xlsx)
  inspect  - Show how each sheet of a workbook would be read

EXAMPLES:
  rosterbook import roster.xlsx --endpoint https://store.example/api \\
      --token $TOKEN --institution-id 42 --institution-name \"North State U\" \\
      --period \"2025-2026 1st Sem\"
  rosterbook export template.xlsx --records records.json --out ./reports \\
      --institution-id 42 --institution-name \"North State U\" \\
      --period \"2025-2026 1st Sem\"
  rosterbook inspect roster.xlsx")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct CallerArgs {
    /// Owning institution id attached to every record
    #[arg(long)]
    institution_id: i64,

    /// Institution display name (used in the export file name)
    #[arg(long, default_value = "institution")]
    institution_name: String,

    /// Reporting period attached to every record
    #[arg(long)]
    period: String,
}

impl CallerArgs {
    fn into_context(self) -> CallerContext {
        CallerContext {
            institution_id: self.institution_id,
            institution_name: self.institution_name,
            period: self.period,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Import a roster workbook and submit it as one batch
    Import {
        /// Path to the workbook (.xlsx)
        file: PathBuf,

        /// Reporting-store collection endpoint
        #[arg(long, env = "ROSTERBOOK_ENDPOINT", default_value = "http://localhost:8080/api")]
        endpoint: String,

        /// Bearer token for the store
        #[arg(long, env = "ROSTERBOOK_TOKEN", default_value = "")]
        token: String,

        #[command(flatten)]
        caller: CallerArgs,

        /// Optional YAML config (anchors, layouts, enum tables)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Extract and report without submitting
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Compose the reporting template from stored records
    Export {
        /// Path to the reporting template (.xlsx)
        template: PathBuf,

        /// Reporting-store collection endpoint
        #[arg(long, env = "ROSTERBOOK_ENDPOINT", default_value = "http://localhost:8080/api")]
        endpoint: String,

        /// Bearer token for the store
        #[arg(long, env = "ROSTERBOOK_TOKEN", default_value = "")]
        token: String,

        #[command(flatten)]
        caller: CallerArgs,

        /// Output directory for the composed document
        #[arg(short, long, default_value = ".")]
        out: PathBuf,

        /// Form tag embedded in the output file name
        #[arg(long, default_value = "FacultyProfile")]
        form_tag: String,

        /// Read records from a JSON file instead of the store
        #[arg(long)]
        records: Option<PathBuf>,

        /// Optional YAML config (anchors, layouts, enum tables)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show anchor resolution and extraction counts per sheet
    Inspect {
        /// Path to the workbook (.xlsx)
        file: PathBuf,

        /// Optional YAML config (anchors, layouts, enum tables)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> RosterResult<()> {
    match cli.command {
        Commands::Import {
            file,
            endpoint,
            token,
            caller,
            config,
            dry_run,
        } => cli::import(file, endpoint, token, caller.into_context(), config, dry_run),

        Commands::Export {
            template,
            endpoint,
            token,
            caller,
            out,
            form_tag,
            records,
            config,
        } => cli::export(
            template,
            endpoint,
            token,
            caller.into_context(),
            out,
            form_tag,
            records,
            config,
        ),

        Commands::Inspect { file, config } => cli::inspect(file, config),
    }
}
