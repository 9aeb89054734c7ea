mod table;

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use log::info;
use pdf_bands::samples::{build_invoice_report, sample_invoice_lines};
use pdf_bands::{Margins, PageSetup, RenderedReport, Report};

/// Renders banded PDF reports from the command line.
///
/// Fonts are looked up under `assets/fonts` or the directory named by the
/// `PDF_BANDS_FONTS_DIR` environment variable, falling back to common system
/// families.  Set `RUST_LOG=debug` to trace page breaks.
#[derive(Parser)]
#[command(author, version, about = "Banded PDF report renderer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the sample multi-page invoice.
    #[command(name = "sample", aliases = ["invoice"])]
    Sample {
        /// Output file.
        #[arg(short, long, default_value = "invoice.pdf")]
        output: PathBuf,

        /// Embed a PDF outline (requires the `bookmarks` feature).
        #[arg(long)]
        bookmarks: bool,
    },

    /// Render a JSON array of objects as a table.
    Table(TableArgs),
}

#[derive(Args)]
struct TableArgs {
    /// JSON file holding an array of objects.
    #[arg(short, long)]
    data: PathBuf,

    /// Output file.
    #[arg(short, long, default_value = "table.pdf")]
    output: PathBuf,

    /// Title printed in the page header.
    #[arg(long, default_value = "Table")]
    title: String,

    /// Comma separated column names; defaults to the keys of the first row.
    #[arg(long, value_delimiter = ',')]
    columns: Option<Vec<String>>,

    /// Page format: A3, A4, A5, Letter or Legal.
    #[arg(long, default_value = "A4")]
    format: String,

    /// Page orientation: P or L.
    #[arg(long, default_value = "P")]
    orientation: String,

    /// Document unit: mm, cm, in or pt.
    #[arg(long, default_value = "in")]
    unit: String,

    /// Margin applied to every side, in the document unit.
    #[arg(long, default_value_t = 0.5)]
    margin: f64,

    /// Embed a PDF outline (requires the `bookmarks` feature).
    #[arg(long)]
    bookmarks: bool,
}

impl TableArgs {
    fn page_setup(&self) -> Result<PageSetup, Box<dyn Error>> {
        Ok(PageSetup::default()
            .with_format(self.format.parse()?)
            .with_orientation(self.orientation.parse()?)
            .with_unit(self.unit.parse()?)
            .with_margins(Margins::uniform(self.margin)))
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Sample { output, bookmarks } => {
            let report = build_invoice_report(sample_invoice_lines());
            write_report(&report, &output, bookmarks)
        }
        Commands::Table(args) => run_table(args),
    };

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn run_table(args: TableArgs) -> Result<(), Box<dyn Error>> {
    let setup = args.page_setup()?;
    let table = table::load_table(&args.data, args.columns.clone())?;
    let report = table::build_table_report(&args.title, table, setup);
    write_report(&report, &args.output, args.bookmarks)
}

fn write_report(report: &Report, output: &Path, bookmarks: bool) -> Result<(), Box<dyn Error>> {
    let rendered = render(report, bookmarks)?;
    rendered.save(output)?;
    info!(
        "Wrote {} ({} pages, {} bytes)",
        output.display(),
        rendered.page_count,
        rendered.bytes.len()
    );
    Ok(())
}

#[cfg(feature = "bookmarks")]
fn render(report: &Report, bookmarks: bool) -> Result<RenderedReport, Box<dyn Error>> {
    let rendered = if bookmarks {
        report.render_with_bookmarks()?
    } else {
        report.render()?
    };
    Ok(rendered)
}

#[cfg(not(feature = "bookmarks"))]
fn render(report: &Report, bookmarks: bool) -> Result<RenderedReport, Box<dyn Error>> {
    if bookmarks {
        return Err("--bookmarks needs a build with `--features bookmarks`".into());
    }
    Ok(report.render()?)
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
