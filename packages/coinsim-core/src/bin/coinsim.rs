//! Coinsim CLI - paper-trade crypto against live prices.
//!
//! One operation per invocation. Prompts and reports go to stdout, logs to
//! stderr (`RUST_LOG=debug` for details).

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Parser};
use coinsim_core::{
    report::{display_number, group_thousands, BalanceReport},
    trade::{self, Quote},
    ApiResponse, CoinCapClient, Coin, Config, Ledger, LedgerStorage, PriceSource, Prompt,
    TradeSide, USD,
};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "coinsim")]
#[command(about = "Cryptocurrency paper-trading simulator")]
#[command(version)]
#[command(group(ArgGroup::new("operation").args(["set", "crypto", "sell", "deposit", "balance"])))]
struct Cli {
    /// Set the initial USD amount. Wipes all previous data and restarts the simulation
    #[arg(long)]
    set: bool,

    /// Code or name of the cryptocurrency to buy (btc/bitcoin, eth/ethereum, doge/dogecoin, xrp/ripple)
    #[arg(short, long, value_name = "COIN")]
    crypto: Option<String>,

    /// Code or name of the cryptocurrency to sell
    #[arg(short, long, value_name = "COIN")]
    sell: Option<String>,

    /// Deposit additional USD without touching other balances
    #[arg(short, long)]
    deposit: bool,

    /// Show the current balance as a table
    #[arg(short, long)]
    balance: bool,

    /// Print the balance as JSON
    #[arg(long, requires = "balance")]
    json: bool,

    /// Ledger file to use instead of the configured one
    #[arg(long, value_name = "PATH")]
    ledger: Option<PathBuf>,
}

enum Operation {
    Set,
    Trade(TradeSide, Coin),
    Deposit,
    Balance { json: bool },
}

impl Cli {
    /// The requested operation. Trade coins are resolved here, before any
    /// network or ledger access.
    fn operation(&self) -> Result<Option<Operation>> {
        let operation = if self.set {
            Some(Operation::Set)
        } else if let Some(input) = &self.crypto {
            Some(Operation::Trade(TradeSide::Buy, input.parse()?))
        } else if let Some(input) = &self.sell {
            Some(Operation::Trade(TradeSide::Sell, input.parse()?))
        } else if self.deposit {
            Some(Operation::Deposit)
        } else if self.balance {
            Some(Operation::Balance { json: self.json })
        } else {
            None
        };
        Ok(operation)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let json = cli.json;

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if json => {
            println!("{}", render_error(&e, true));
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("{}", render_error(&e, false));
            ExitCode::FAILURE
        }
    }
}

/// Failure text for the terminal, or an `ApiResponse` error body when the
/// caller asked for JSON.
fn render_error(err: &anyhow::Error, json: bool) -> String {
    let message = format!("{err:#}");
    if json {
        if let Ok(body) = serde_json::to_string_pretty(&ApiResponse::<()>::err(message.as_str())) {
            return body;
        }
    }
    format!("Error: {message}")
}

fn run(cli: Cli) -> Result<()> {
    let Some(operation) = cli.operation()? else {
        bail!("Please use command line arguments. Run `coinsim --help` for the list of operations.");
    };

    let mut config = Config::load().context("loading configuration")?;
    if let Some(path) = cli.ledger {
        config.ledger_file = Some(path);
    }

    let ledger_path = config.ledger_path();
    let mut ledger = Ledger::open_file(&ledger_path)
        .with_context(|| format!("opening ledger {}", ledger_path.display()))?;
    let mut prompt = Prompt::stdio();

    match operation {
        Operation::Set => {
            let amount =
                prompt.amount("Enter initial USD amount to set for the simulation: ")?;
            trade::reset_balance(&mut ledger, amount)?;
            println!("USD amount set to ${} in the portfolio.", money(amount));
        }
        Operation::Deposit => {
            let amount = prompt.amount("Enter USD amount you want to deposit: ")?;
            trade::deposit(&mut ledger, amount)?;
            println!(
                "You have successfully deposited ${} to your account",
                money(amount)
            );
        }
        Operation::Balance { json } => {
            let report = BalanceReport::from_ledger(&ledger);
            if json {
                println!("{}", serde_json::to_string_pretty(&ApiResponse::ok(report))?);
            } else {
                println!("{}", report.render());
            }
        }
        Operation::Trade(side, coin) => {
            let client = CoinCapClient::from_config(&config)?;
            run_trade(&mut ledger, &client, &mut prompt, side, coin)?;
        }
    }

    Ok(())
}

fn run_trade<S: LedgerStorage, R: BufRead, W: Write>(
    ledger: &mut Ledger<S>,
    prices: &impl PriceSource,
    prompt: &mut Prompt<R, W>,
    side: TradeSide,
    coin: Coin,
) -> Result<()> {
    let price = prices.price_usd(coin)?;

    let quantity = prompt.quantity("How much cryptocurrency? ")?;
    let Quote { total, .. } = trade::quote(coin, quantity, price);
    prompt.say(&format!(
        "The price of {} {coin} is ${}",
        display_number(quantity),
        group_thousands(total, 4)
    ))?;

    let question = format!("Do you want to {} this amount? (yes/no | y/n) ", side.verb());
    if !prompt.confirm(&question)? {
        tracing::debug!("{} of {} {} declined", side.verb(), quantity, coin);
        return Ok(());
    }

    let fill = trade::execute(ledger, side, coin, quantity, price)?;
    prompt.say(&format!(
        "You have just {} {} {}",
        side.past_tense(),
        display_number(fill.quantity),
        fill.coin
    ))?;
    tracing::debug!(
        "USD balance after {}: {}",
        side.verb(),
        ledger.balance(USD)
    );
    Ok(())
}

fn money(amount: f64) -> String {
    group_thousands(amount, 2)
}
