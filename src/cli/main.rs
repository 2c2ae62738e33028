use clap::{Parser, Subcommand};
use reqwest::{Client, Url};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "property-search-cli")]
#[command(about = "Property search service CLI", long_about = None)]
struct Cli {
    #[arg(short, long, env = "PROPERTY_SEARCH_ENDPOINT", default_value = "http://localhost:8080")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Free-text property search
    Find {
        /// Search text; omit to match everything
        text: Option<String>,

        #[arg(short, long, default_value = "0")]
        page: usize,

        /// Street, Town, Postcode, Date or Price
        #[arg(short = 'c', long)]
        sort_column: Option<String>,

        /// Ascending or Descending
        #[arg(short = 'd', long)]
        sort_direction: Option<String>,

        #[arg(long)]
        town: Option<String>,

        #[arg(long)]
        county: Option<String>,

        #[arg(long)]
        locality: Option<String>,

        #[arg(long)]
        district: Option<String>,
    },

    /// Properties near a postcode
    Near {
        #[arg(value_name = "POSTCODE")]
        postcode: String,

        /// Radius in kilometres
        #[arg(short, long, default_value = "1")]
        distance: f64,

        #[arg(short, long, default_value = "0")]
        page: usize,
    },

    /// Completions for a partial query
    Suggest {
        #[arg(value_name = "TEXT")]
        text: String,
    },

    /// Index document count and indexer progress
    Stats {
        /// properties or postcodes
        #[arg(default_value = "properties")]
        index: String,
    },

    /// Upload a JSON array of records from a file
    Import {
        /// properties or postcodes
        index: String,

        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Check server health
    Health,
}

fn api_url(endpoint: &str, segments: &[&str]) -> anyhow::Result<Url> {
    let mut url = Url::parse(endpoint)?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("endpoint cannot be a base URL: {}", endpoint))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Find URL; blank text uses the match-everything route and unset options are omitted
fn find_url(
    endpoint: &str,
    text: Option<&str>,
    page: usize,
    options: &[(&str, Option<&str>)],
) -> anyhow::Result<Url> {
    let page = page.to_string();
    let mut url = match text.map(str::trim).filter(|t| !t.is_empty()) {
        Some(text) => api_url(endpoint, &["api", "property", "find", text, &page])?,
        None => api_url(endpoint, &["api", "property", "find", &page])?,
    };

    {
        let mut query = url.query_pairs_mut();
        for (key, value) in options {
            if let Some(value) = value {
                query.append_pair(key, value);
            }
        }
    }
    if url.query() == Some("") {
        url.set_query(None);
    }
    Ok(url)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = Client::new();

    let request = match cli.command {
        Commands::Find {
            text,
            page,
            sort_column,
            sort_direction,
            town,
            county,
            locality,
            district,
        } => {
            let url = find_url(
                &cli.endpoint,
                text.as_deref(),
                page,
                &[
                    ("SortColumn", sort_column.as_deref()),
                    ("SortDirection", sort_direction.as_deref()),
                    ("town", town.as_deref()),
                    ("county", county.as_deref()),
                    ("locality", locality.as_deref()),
                    ("district", district.as_deref()),
                ],
            )?;
            client.get(url)
        }

        Commands::Near {
            postcode,
            distance,
            page,
        } => client.get(api_url(
            &cli.endpoint,
            &["api", "property", &postcode, &distance.to_string(), &page.to_string()],
        )?),

        Commands::Suggest { text } => {
            client.get(api_url(&cli.endpoint, &["api", "property", "suggest", &text])?)
        }

        Commands::Stats { index } => client.get(api_url(&cli.endpoint, &["api", &index, "stats"])?),

        Commands::Import { index, file } => {
            let body = tokio::fs::read(&file).await?;
            let records: serde_json::Value = serde_json::from_slice(&body)?;
            client
                .post(api_url(&cli.endpoint, &["api", &index, "import"])?)
                .json(&records)
        }

        Commands::Health => client.get(api_url(&cli.endpoint, &["health"])?),
    };

    let response = request.send().await?;
    let status = response.status();
    let body: serde_json::Value = response.json().await?;
    println!("{}", serde_json::to_string_pretty(&body)?);

    if !status.is_success() {
        anyhow::bail!("request failed with status {}", status);
    }
    Ok(())
}
