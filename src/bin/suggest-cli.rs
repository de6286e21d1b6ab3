use clap::{Parser, Subcommand, ValueEnum};
use reqwest::header::{HeaderValue, ACCEPT};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "suggest-cli")]
#[command(about = "Command line client for the suggestion service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Response representation to request.
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Xml,
}

impl Format {
    fn accept(self) -> HeaderValue {
        match self {
            Format::Json => HeaderValue::from_static("application/json"),
            Format::Xml => HeaderValue::from_static("application/xml"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Insert or overwrite a term
    Insert {
        key: String,
        /// JSON value; anything that is not valid JSON is sent as a string
        value: Option<String>,
    },
    /// List every term starting with a prefix
    Suggest {
        #[arg(default_value = "")]
        prefix: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let request = match cli.command {
        Commands::Insert { key, value } => {
            let value = value
                .map(|raw| serde_json::from_str(&raw).unwrap_or(Value::String(raw)))
                .unwrap_or(Value::Null);
            client
                .post(&cli.url)
                .json(&json!({ "key": key, "value": value }))
        }
        Commands::Suggest { prefix } => client.get(&cli.url).query(&[("key", prefix)]),
    };

    let res = request.header(ACCEPT, cli.format.accept()).send().await?;
    print_response(res, cli.format).await
}

async fn print_response(
    res: reqwest::Response,
    format: Format,
) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: service returned status {}", status);
        if !text.is_empty() {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    match format {
        Format::Json => {
            let json: Value = serde_json::from_str(&text)?;
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        Format::Xml => println!("{}", text),
    }
    Ok(())
}
