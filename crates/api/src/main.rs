use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use optibrain_api::{DecisionService, EngineConfig, ErrorKind, Operation};

#[derive(Parser)]
#[command(name = "optibrain", about = "Retail decision engine: forecasts, replenishment, pricing, segments, routing")]
struct Cli {
    /// TOML configuration file (defaults apply when omitted).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON request file; reads stdin when omitted.
    #[arg(long, global = true)]
    input: Option<PathBuf>,

    /// Pretty-print the JSON response.
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Demand forecast: {history: [{ds, y}], days}
    Forecast,
    /// Price recommendation: {current_price, forecast, inventory_level, min_price, max_price}
    Price,
    /// Replenishment plan: {forecast_mean, forecast_std, lead_time_days, service_level}
    Inventory,
    /// Customer segments: {customers: [{customer_id, recency, frequency, monetary}]}
    Segment,
    /// Order routing: {order_id, sku_id, quantity, nodes: [{id, is_active, priority}]}
    Route,
}

impl From<Command> for Operation {
    fn from(c: Command) -> Self {
        match c {
            Command::Forecast => Operation::Forecast,
            Command::Price => Operation::Price,
            Command::Inventory => Operation::Inventory,
            Command::Segment => Operation::Segment,
            Command::Route => Operation::Route,
        }
    }
}

fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("reading request from {}", path.display()))
        }
        None => {
            let mut body = String::new();
            std::io::stdin()
                .read_to_string(&mut body)
                .context("reading request from stdin")?;
            Ok(body)
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = EngineConfig::load(cli.config.as_deref()).context("loading configuration")?;
    optibrain_observability::init(&config.logging);

    let service = DecisionService::new(&config).context("building decision service")?;
    let body = read_input(cli.input.as_deref())?;

    let (value, exit_code) = match service.handle_json(cli.command.into(), &body) {
        Ok(value) => (value, 0),
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::Validation => 2,
                ErrorKind::Unavailable => 3,
            };
            (err.to_json(), code)
        }
    };

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    println!("{rendered}");

    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}
