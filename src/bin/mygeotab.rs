use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use mygeotab_rs::config::CONFIG_FILE;
use mygeotab_rs::{Config, Credentials, MyGeotabApi, MyGeotabClient, Params};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mygeotab")]
#[command(about = "MyGeotab API command line client", long_about = None)]
struct Cli {
    /// Config file used when no username is given
    #[arg(short, long, default_value = CONFIG_FILE)]
    config: String,
    #[arg(short, long, env = "MYGEOTAB_USERNAME")]
    username: Option<String>,
    #[arg(short, long, env = "MYGEOTAB_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    #[arg(short, long, env = "MYGEOTAB_DATABASE")]
    database: Option<String>,
    #[arg(short, long, env = "MYGEOTAB_SERVER")]
    server: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and print the resolved server and database
    Authenticate,
    /// Get entities of a type, optionally filtered
    Get {
        type_name: String,
        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<u64>,
        /// Search criteria as key=value (value may be JSON)
        #[arg(long = "search", value_name = "KEY=VALUE")]
        search: Vec<String>,
    },
    /// Call any API method
    Call {
        method: String,
        #[arg(short, long)]
        type_name: Option<String>,
        /// Parameters as a JSON object
        #[arg(long, default_value = "{}")]
        params: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let client = build_client(&cli)?;

    let result = match cli.command {
        Commands::Authenticate => {
            let credentials = client.authenticate().await?;
            info!("Authenticated as {}", credentials.username());
            println!(
                "server: {}\ndatabase: {}",
                credentials.server(),
                credentials.database().unwrap_or("")
            );
            return Ok(());
        }
        Commands::Get {
            type_name,
            limit,
            search,
        } => {
            let mut params = parse_search(&search)?;
            if let Some(limit) = limit {
                params.insert("resultsLimit".to_string(), Value::from(limit));
            }
            client.search(&type_name, params).await?
        }
        Commands::Call {
            method,
            type_name,
            params,
        } => {
            let params: Params =
                serde_json::from_str(&params).context("--params must be a JSON object")?;
            client.call(&method, type_name.as_deref(), params).await?
        }
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&result.unwrap_or(Value::Null))?
    );
    Ok(())
}

fn build_client(cli: &Cli) -> Result<MyGeotabClient> {
    let Some(username) = &cli.username else {
        let config = Config::from_file(&cli.config)
            .with_context(|| format!("Failed to load {}", cli.config))?;
        return Ok(MyGeotabClient::from_config(&config)?);
    };

    let credentials = Credentials::new(
        username.clone(),
        cli.password.clone(),
        cli.database.clone(),
        None,
        cli.server.clone(),
    )?;
    Ok(MyGeotabClient::new(credentials))
}

fn parse_search(pairs: &[String]) -> Result<Params> {
    let mut params = Params::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("Invalid search criterion '{pair}', expected KEY=VALUE"))?;
        let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
        params.insert(key.to_string(), value);
    }
    Ok(params)
}
