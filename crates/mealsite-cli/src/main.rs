mod display;

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use mealsite_core::{
    AliasTable, Aggregator, CanonicalSite, DEFAULT_FIELDS, MealField, csv_file_name,
    default_selection, find_site, normalize_key, write_csv,
};
use mealsite_sync::config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS};
use mealsite_sync::{ClientConfig, Collection, SitesClient, collect_with_report, load_sites};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mealsite", version, about = "Browse and export meals by canonical site")]
struct Cli {
    /// Crawl backend base URL.
    #[arg(long, global = true, env = "MEALSITE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Per-request timeout in milliseconds.
    #[arg(
        long,
        global = true,
        env = "MEALSITE_TIMEOUT_MS",
        default_value_t = DEFAULT_TIMEOUT_MS
    )]
    timeout_ms: u64,

    /// JSON alias table replacing the built-in one.
    #[arg(long, global = true, env = "MEALSITE_ALIASES")]
    aliases: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List canonical sites, largest first.
    Sites {
        #[arg(long)]
        json: bool,
    },
    /// Show the meals of one site (default: the largest).
    Meals {
        site: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Export the meals of one site as CSV.
    Export {
        site: Option<String>,
        /// Output path, `-` for stdout. Defaults to `<site>.csv`.
        #[arg(long, short)]
        out: Option<PathBuf>,
        /// Comma-separated columns.
        #[arg(long, value_delimiter = ',', value_parser = parse_field)]
        fields: Vec<MealField>,
    },
}

fn parse_field(s: &str) -> Result<MealField, String> {
    MealField::parse(s).ok_or_else(|| format!("unknown meal field '{s}'"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::info!("mealsite v{}", env!("CARGO_PKG_VERSION"));

    let aliases = match &cli.aliases {
        Some(path) => AliasTable::from_path(path)?,
        None => AliasTable::default(),
    };
    let aggregator = Aggregator::new(aliases);
    let config = ClientConfig::new(cli.base_url.clone()).with_timeout_ms(cli.timeout_ms);
    let client = SitesClient::new(&config).context("configuring backend client")?;

    let sites = load_sites(&client, &aggregator)
        .await
        .with_context(|| format!("unable to load sites from {}", client.base_url()))?;

    match cli.command {
        Command::Sites { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&sites)?);
            } else {
                print!("{}", display::render_sites(&sites));
            }
        }
        Command::Meals { site, json } => {
            let site = select(&sites, site.as_deref())?;
            let collection = collect_with_report(&client, site).await;
            report_failures(&collection);
            if json {
                println!("{}", serde_json::to_string_pretty(&collection.meals)?);
            } else {
                print!("{}", display::render_meals(site, &collection.meals));
            }
        }
        Command::Export { site, out, fields } => {
            let site = select(&sites, site.as_deref())?;
            let collection = collect_with_report(&client, site).await;
            report_failures(&collection);
            if collection.meals.is_empty() {
                eprintln!("No meals to export for {}.", site.display_name);
                return Ok(());
            }

            let fields = if fields.is_empty() {
                DEFAULT_FIELDS.to_vec()
            } else {
                fields
            };
            let out = out.unwrap_or_else(|| PathBuf::from(csv_file_name(site)));
            if out.as_os_str() == "-" {
                write_csv(io::stdout().lock(), &collection.meals, &fields)?;
            } else {
                let file = File::create(&out)
                    .with_context(|| format!("creating {}", out.display()))?;
                write_csv(BufWriter::new(file), &collection.meals, &fields)
                    .with_context(|| format!("writing {}", out.display()))?;
                eprintln!(
                    "Wrote {} meals to {}",
                    collection.meals.len(),
                    out.display()
                );
            }
        }
    }

    Ok(())
}

/// Pick a site by key or display name, or the default selection when none
/// is given.
fn select<'a>(
    sites: &'a [CanonicalSite],
    wanted: Option<&str>,
) -> anyhow::Result<&'a CanonicalSite> {
    let key = match wanted {
        Some(wanted) => {
            if find_site(sites, wanted).is_some() {
                wanted.to_string()
            } else {
                normalize_key(wanted)
            }
        }
        None => match default_selection(sites, None) {
            Some(key) => key,
            None => bail!("no sites available"),
        },
    };
    find_site(sites, &key).with_context(|| {
        let known: Vec<&str> = sites.iter().map(|s| s.site_id.as_str()).collect();
        format!("unknown site '{key}' (known: {})", known.join(", "))
    })
}

fn report_failures(collection: &Collection) {
    if !collection.failed_source_ids.is_empty() {
        eprintln!(
            "Warning: meals unavailable for source ids: {}",
            collection.failed_source_ids.join(", ")
        );
    }
}
