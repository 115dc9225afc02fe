use clap::{Parser, Subcommand};
use roster_sheets::config;
use roster_sheets::document::XlsxRenderer;
use roster_sheets::pipeline::{self, RenderOptions};
use roster_sheets::{output, source};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "roster-sheets")]
#[command(about = "Render workforce rosters into per-sheet XLSX timesheets")]
#[command(long_about = "\
Render workforce rosters into per-sheet XLSX timesheets

Each row of the roster is one employee assignment. Rows are grouped by their
sheet name and every group becomes one workbook named after the sheet.

Roster columns (by position, CSV separated by ';'):

  0 employee id      1 employee name   2 nickname     3 approver name
  4 approver id      5 sector          6 sheet name   7 shift
  8 substitutes      9 flags

Template selection (first match wins):
  flag 'daily' or '!' in the sheet name     daily
  more than 6 members and 'administrative'  daily-administrative
    (or '*' in the sheet name)
  more than 6 members                       daily
  otherwise                                 weekly

Every rendered row is also listed in dumplist.txt in the output directory.

Run 'roster-sheets gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: config.toml next to the roster, if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render every sheet of a roster and write the audit log
    Render {
        /// Roster file (.csv or .xlsx)
        input: PathBuf,

        /// Output directory
        #[arg(long, default_value = "out")]
        output: PathBuf,

        /// Exit with an error when any sheet produced no document
        #[arg(long)]
        fail_on_partial: bool,
    },
    /// Show how a roster would be grouped and rendered, without writing
    Check {
        /// Roster file (.csv or .xlsx)
        input: PathBuf,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Render {
            input,
            output: output_dir,
            fail_on_partial,
        } => {
            let config = config::load_config(&input, cli.config.as_deref())?;
            let dataset = source::load_dataset(&input, &config.source);
            let options = RenderOptions {
                on_conflict: config.integrity.on_approver_conflict,
            };

            println!("==> Rendering {} \u{2192} {}", input.display(), output_dir.display());
            let report = pipeline::render(&dataset, &output_dir, &XlsxRenderer::new(), &options)?;
            output::print_render_report(&report);

            if fail_on_partial && report.is_partial() {
                return Err("run was partial".into());
            }
        }
        Command::Check { input } => {
            let config = config::load_config(&input, cli.config.as_deref())?;
            let dataset = source::load_dataset(&input, &config.source);
            println!("==> Checking {}", input.display());
            let plans = pipeline::plan(&dataset);
            output::print_check_output(&plans, dataset.len());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Log to stderr so stdout stays reserved for the command's own output.
///
/// Filter comes from `RUST_LOG`, defaulting to `info`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
