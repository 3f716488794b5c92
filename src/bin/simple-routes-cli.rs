use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "simple-routes-cli")]
#[command(about = "Inspect the route table of a running simple-routes server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Introspection mount point on the server
    #[arg(long, default_value = "/_routes")]
    path: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered routes
    Routes,
    /// Generate the URL of a named route
    Url {
        /// Route name
        name: String,
        /// Path arguments as key=value
        #[arg(value_parser = parse_key_value)]
        args: Vec<(String, String)>,
    },
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got `{}`", s))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = format!("{}{}", cli.url.trim_end_matches('/'), cli.path);

    match cli.command {
        Commands::Routes => {
            let res = client.get(&base).send().await?;
            print_response(res).await?;
        }
        Commands::Url { name, args } => {
            let mut query = vec![("route".to_string(), name)];
            query.extend(args);
            let res = client.get(format!("{}/url", base)).query(&query).send().await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
