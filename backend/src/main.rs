//! SalesDash CLI - Retail sales dashboard over a CSV order export
//!
//! # Main Commands
//!
//! ```bash
//! salesdash serve                              # Start HTTP server (port 3000)
//! salesdash report -r East -c Technology       # Dashboard JSON for a selection
//! salesdash export -r West                     # Write filtered_sales_data.csv
//! ```
//!
//! # Inspection Commands
//!
//! ```bash
//! salesdash options                            # Filter values, overview, cleaning report
//! salesdash clean -o cleaned.csv               # Cleaned dataset as CSV
//! ```
//!
//! The dataset comes from `--data`, then `SALESDASH_DATA`, then `train.csv`.

use clap::{Parser, Subcommand};
use salesdash::server::{resolve_data_path, start_server, ServerConfig};
use salesdash::transform::format_delimiter;
use salesdash::{
    build_dashboard, export, export_selection, load_dataset, DashboardOptions, DashboardResponse,
    FilterSelection, OptionsResponse, PreparedDataset, EXPORT_FILE_NAME,
};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "salesdash")]
#[command(about = "Retail sales analytics dashboard over a CSV order export", long_about = None)]
struct Cli {
    /// Sales CSV file (default: $SALESDASH_DATA or train.csv)
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show filter values, dataset overview and cleaning report
    Options,

    /// Write the cleaned dataset as CSV
    Clean {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compute the dashboard for a selection
    Report {
        /// Regions to include (repeatable or comma-separated, default: all)
        #[arg(short, long, value_delimiter = ',')]
        region: Vec<String>,

        /// Categories to include (repeatable or comma-separated, default: all)
        #[arg(short, long, value_delimiter = ',')]
        category: Vec<String>,

        /// Number of top products
        #[arg(long, default_value = "15")]
        top_products: usize,

        /// Number of top sub-categories
        #[arg(long, default_value = "20")]
        top_sub_categories: usize,

        /// Number of top customers
        #[arg(long, default_value = "15")]
        top_customers: usize,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export the rows of a selection as CSV
    Export {
        /// Regions to include (repeatable or comma-separated, default: all)
        #[arg(short, long, value_delimiter = ',')]
        region: Vec<String>,

        /// Categories to include (repeatable or comma-separated, default: all)
        #[arg(short, long, value_delimiter = ',')]
        category: Vec<String>,

        /// Output file
        #[arg(short, long, default_value = EXPORT_FILE_NAME)]
        output: PathBuf,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: $SALESDASH_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let data = resolve_data_path(cli.data.as_deref());

    let result = match cli.command {
        Commands::Options => cmd_options(&data),

        Commands::Clean { output } => cmd_clean(&data, output.as_deref()),

        Commands::Report {
            region,
            category,
            top_products,
            top_sub_categories,
            top_customers,
            output,
        } => {
            let options = DashboardOptions {
                top_products,
                top_sub_categories,
                top_customers,
            };
            cmd_report(&data, region, category, &options, output.as_deref())
        }

        Commands::Export {
            region,
            category,
            output,
        } => cmd_export(&data, region, category, &output),

        Commands::Serve { port } => cmd_serve(data, port).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn open(data: &Path) -> Result<PreparedDataset, Box<dyn std::error::Error>> {
    eprintln!("📄 Processing: {}", data.display());
    let dataset = load_dataset(data)?;
    eprintln!(
        "   Encoding: {}, delimiter: '{}'",
        dataset.overview.encoding,
        format_delimiter(dataset.overview.delimiter)
    );
    Ok(dataset)
}

/// An empty flag list means "no restriction".
fn selection_from(
    dataset: &PreparedDataset,
    regions: Vec<String>,
    categories: Vec<String>,
) -> FilterSelection {
    let some = |values: Vec<String>| (!values.is_empty()).then_some(values);
    FilterSelection::from_parts(&dataset.table, some(regions), some(categories))
}

fn cmd_options(data: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = open(data)?;
    let json = serde_json::to_string_pretty(&OptionsResponse::from(&dataset))?;
    write_output(json.as_bytes(), None)
}

fn cmd_clean(data: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = open(data)?;
    let bytes = export(&dataset.table.view())?;
    eprintln!("✅ {} cleaned rows", dataset.table.len());
    write_output(&bytes, output)
}

fn cmd_report(
    data: &Path,
    regions: Vec<String>,
    categories: Vec<String>,
    options: &DashboardOptions,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = open(data)?;
    let selection = selection_from(&dataset, regions, categories);
    let dashboard = build_dashboard(&dataset, &selection, options);

    if dashboard.filtered_rows == 0 {
        eprintln!("⚠️  No rows match the current selection");
    } else {
        eprintln!("\n📊 Total sales: {:.2}", dashboard.metrics.total_sales);
        eprintln!("   Orders: {}", dashboard.metrics.total_orders);
        eprintln!("   Products: {}", dashboard.metrics.unique_products);
        eprintln!("   Customers: {}", dashboard.metrics.unique_customers);
        if let Some(ref top) = dashboard.top_region {
            eprintln!("   Top region: {} ({:.2})", top.key, top.sales);
        }
    }

    let json = serde_json::to_string_pretty(&DashboardResponse::from(dashboard))?;
    write_output(json.as_bytes(), output)
}

fn cmd_export(
    data: &Path,
    regions: Vec<String>,
    categories: Vec<String>,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = open(data)?;
    let selection = selection_from(&dataset, regions, categories);
    let bytes = export_selection(&dataset, &selection)?;
    write_output(&bytes, Some(output))
}

async fn cmd_serve(data: PathBuf, port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ServerConfig::from_env();
    config.data = data;
    if let Some(port) = port {
        config.port = port;
    }
    start_server(config).await
}

fn write_output(content: &[u8], path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content)?;
            if !content.ends_with(b"\n") {
                stdout.write_all(b"\n")?;
            }
        }
    }
    Ok(())
}
