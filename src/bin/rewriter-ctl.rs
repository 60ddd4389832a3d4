use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, StatusCode, Url};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "rewriter-ctl")]
#[command(about = "Management CLI for the base url rewriter admin API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:8081")]
    url: String,

    /// Admin API key (sent as a Bearer token)
    #[arg(short, long)]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show enabled flag, advanced basis and registry size
    Status,
    /// Turn rewriting on
    Enable,
    /// Turn rewriting off; requests pass through unchanged
    Disable,
    /// List named domains
    Domains,
    /// Show one named domain
    Get { name: String },
    /// Register or overwrite a named domain
    Put { name: String, url: String },
    /// Remove a named domain
    Remove { name: String },
    /// Remove every named domain
    Clear,
    /// Show, set or remove the global domain
    Global {
        /// New global base url
        url: Option<String>,
        #[arg(long, conflicts_with = "url")]
        remove: bool,
    },
    /// Activate advanced mode with the client's base url
    Advanced { base_url: String },
    /// Show what a url would be rewritten to
    Resolve {
        url: String,
        #[arg(short, long)]
        domain: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let (method, segments, body): (Method, Vec<String>, Option<Value>) = match cli.command {
        Commands::Status => (Method::GET, admin_path(&["status"]), None),
        Commands::Enable => (Method::PUT, admin_path(&["enabled"]), Some(json!({ "enabled": true }))),
        Commands::Disable => (Method::PUT, admin_path(&["enabled"]), Some(json!({ "enabled": false }))),
        Commands::Domains => (Method::GET, admin_path(&["domains"]), None),
        Commands::Get { name } => (Method::GET, admin_path(&["domains", name.as_str()]), None),
        Commands::Put { name, url } => (Method::PUT, admin_path(&["domains", name.as_str()]), Some(json!({ "url": url }))),
        Commands::Remove { name } => (Method::DELETE, admin_path(&["domains", name.as_str()]), None),
        Commands::Clear => (Method::DELETE, admin_path(&["domains"]), None),
        Commands::Global { url: Some(url), .. } => (Method::PUT, admin_path(&["global"]), Some(json!({ "url": url }))),
        Commands::Global { remove: true, .. } => (Method::DELETE, admin_path(&["global"]), None),
        Commands::Global { .. } => (Method::GET, admin_path(&["global"]), None),
        Commands::Advanced { base_url } => (
            Method::PUT,
            admin_path(&["advanced"]),
            Some(json!({ "base_url": base_url })),
        ),
        Commands::Resolve { url, domain } => (
            Method::POST,
            admin_path(&["resolve"]),
            Some(json!({ "url": url, "domain": domain })),
        ),
    };

    let mut request = client.request(method, endpoint(&cli.url, &segments)?).headers(headers);
    if let Some(body) = body {
        request = request.json(&body);
    }
    print_response(request.send().await?).await
}

fn admin_path(segments: &[&str]) -> Vec<String> {
    std::iter::once("admin")
        .chain(segments.iter().copied())
        .map(String::from)
        .collect()
}

/// Join `segments` onto the admin base url, percent-encoding each one.
fn endpoint(base: &str, segments: &[String]) -> Result<Url, Box<dyn std::error::Error>> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| format!("`{base}` cannot be used as a base url"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    if status == StatusCode::NO_CONTENT {
        println!("ok");
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
