use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "quake-cli")]
#[command(about = "Command-line client for the quake-finder API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the page route table
    Routes,
    /// List registered cities
    Cities,
    /// Register a city
    AddCity {
        name: String,
        #[arg(allow_hyphen_values = true)]
        latitude: f64,
        #[arg(allow_hyphen_values = true)]
        longitude: f64,
    },
    /// Remove a city
    RemoveCity { id: u64 },
    /// Find the earthquake closest to a city (YYYY-MM-DD dates)
    Search {
        city_id: u64,
        start_date: String,
        end_date: String,
        /// Submit as a background task instead of waiting
        #[arg(long)]
        background: bool,
    },
    /// Check a background search
    Task { id: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let request = match cli.command {
        Commands::Routes => client.get(format!("{}/api/routes", base)),
        Commands::Cities => client.get(format!("{}/api/cities", base)),
        Commands::AddCity {
            name,
            latitude,
            longitude,
        } => client
            .post(format!("{}/api/cities", base))
            .json(&json!({ "name": name, "latitude": latitude, "longitude": longitude })),
        Commands::RemoveCity { id } => client.delete(format!("{}/api/cities/{}", base, id)),
        Commands::Search {
            city_id,
            start_date,
            end_date,
            background,
        } => {
            let url = format!("{}/api/cities/{}/earthquakes", base, city_id);
            let builder = if background { client.post(url) } else { client.get(url) };
            builder.query(&[("start_date", start_date), ("end_date", end_date)])
        }
        Commands::Task { id } => client.get(format!("{}/api/cities/results/{}", base, id)),
    };

    print_response(request.send().await?).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
        if !text.is_empty() {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    if text.is_empty() {
        println!("{}", status);
        return Ok(());
    }

    let json: Value = serde_json::from_str(&text)?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
