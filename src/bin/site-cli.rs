use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, HOST};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "site-cli")]
#[command(about = "Query a running site server as a given site", long_about = None)]
struct Cli {
    /// Server base URL.
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Site domain sent as the Host header.
    #[arg(long)]
    host: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a logical path
    Path {
        /// Logical path, e.g. /blog/my-post
        path: String,
    },
    /// Resolve one element
    Element {
        /// content, wrapper or slug
        kind: String,
        id: String,
        /// Selector for slug elements
        #[arg(long)]
        selector: Option<String>,
    },
    /// Read a public site value
    Value { key: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let mut headers = HeaderMap::new();
    headers.insert(HOST, HeaderValue::from_str(&cli.host)?);

    let request = match cli.command {
        Commands::Path { path } => {
            headers.insert("x-current-path", HeaderValue::from_str(&path)?);
            client.get(format!("{base}/paths"))
        }
        Commands::Element { kind, id, selector } => {
            if let Some(selector) = selector {
                headers.insert("x-selector", HeaderValue::from_str(&selector)?);
            }
            client.get(format!("{base}/{kind}/{id}"))
        }
        Commands::Value { key } => client.get(format!("{base}/domain/{key}")),
    };

    let res = request.headers(headers).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if let Some(residual) = res.headers().get("x-query-parameters") {
        eprintln!("Residual: {}", residual.to_str().unwrap_or_default());
    }

    let json: Value = res.json().await?;
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
    }
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
