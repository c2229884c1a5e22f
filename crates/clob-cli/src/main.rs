//! clob-signer: credentials, request headers and signed orders from the command line.
//!
//! Reads the wallet key from `WALLET_PRIVATE_KEY` and configuration from the
//! environment (or `--config`). Logs go to stderr; command output to stdout.

use alloy_primitives::U256;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use clob_core::api::ReqwestTransport;
use clob_core::signing::l2::L2Signature;
use clob_core::{
    ClobConfig, ClobSession, CredentialManager, MarketOrderArgs, OrderArgs, OrderOptions,
    OrderSigner, OrderType, Side, SignedOrder, TickSize, WalletSigner,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "clob-signer", version, about)]
struct Cli {
    /// Config file layered under CLOB_* environment variables.
    #[arg(long, global = true)]
    config: Option<String>,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the wallet address.
    Address,
    /// Create or derive API credentials.
    Credentials {
        /// Print the secret and passphrase as well as the key.
        #[arg(long)]
        show_secrets: bool,
    },
    /// Print L2 headers for a request.
    L2Headers {
        #[arg(long, default_value = "GET")]
        method: String,
        #[arg(long)]
        path: String,
        #[arg(long)]
        body: Option<String>,
    },
    /// Build and sign an order without submitting it.
    SignOrder(OrderCommand),
    /// Build, sign and submit an order.
    PostOrder {
        #[command(flatten)]
        order: OrderCommand,
        #[arg(long, default_value = "GTC")]
        order_type: OrderType,
    },
}

#[derive(Args, Debug)]
struct OrderCommand {
    #[arg(long)]
    token_id: U256,
    /// Price per share, 0 to 1.
    #[arg(long)]
    price: Decimal,
    /// Shares for limit orders; USDC budget for market BUY.
    #[arg(long)]
    size: Decimal,
    #[arg(long)]
    side: Side,
    #[arg(long, default_value = "0.01")]
    tick_size: TickSize,
    /// Settle through the neg-risk exchange.
    #[arg(long)]
    neg_risk: bool,
    /// Size the order as a market order.
    #[arg(long)]
    market: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = match &cli.config {
        Some(path) => ClobConfig::from_file(path),
        None => ClobConfig::from_env(),
    }
    .context("Failed to load configuration")?;
    let wallet = WalletSigner::from_env().context("Failed to load wallet")?;

    match cli.command {
        Command::Address => {
            println!("{}", wallet.address()?);
        }
        Command::Credentials { show_secrets } => {
            let manager = credential_manager(&config)?;
            let credentials = manager.create_or_derive(&wallet).await?;
            if show_secrets {
                let output = serde_json::json!({
                    "apiKey": credentials.key,
                    "secret": credentials.secret,
                    "passphrase": credentials.passphrase,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("{}", credentials.key);
            }
        }
        Command::L2Headers { method, path, body } => {
            let manager = credential_manager(&config)?;
            let credentials = manager.create_or_derive(&wallet).await?;
            let signature = L2Signature::new(
                wallet.address()?,
                &credentials,
                &method,
                &path,
                body.as_deref(),
                None,
            )?;
            for (name, value) in signature.headers() {
                println!("{name}: {value}");
            }
        }
        Command::SignOrder(order) => {
            let signed = sign_order(&config, &wallet, &order).await?;
            println!("{}", serde_json::to_string_pretty(&signed)?);
        }
        Command::PostOrder { order, order_type } => {
            let signed = sign_order(&config, &wallet, &order).await?;
            let manager = credential_manager(&config)?;
            let transport = Arc::new(ReqwestTransport::new()?);
            let session = ClobSession::connect(&manager, wallet, transport).await?;

            let response = session.post_order(signed, order_type).await?;
            info!(order_id = %response.order_id, status = %response.status, "Order submitted");
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "success": response.success,
                    "orderID": response.order_id,
                    "status": response.status,
                    "errorMsg": response.error_msg,
                }))?
            );
        }
    }

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "clob_cli=info,clob_core=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn credential_manager(config: &ClobConfig) -> Result<CredentialManager> {
    let transport = Arc::new(ReqwestTransport::new()?);
    Ok(CredentialManager::new(config.clone(), transport))
}

async fn sign_order(
    config: &ClobConfig,
    wallet: &WalletSigner,
    order: &OrderCommand,
) -> Result<SignedOrder> {
    let signer = OrderSigner::new(config.clone());
    let options = OrderOptions {
        neg_risk: order.neg_risk,
        ..OrderOptions::default()
    };

    let signed = if order.market {
        let args = MarketOrderArgs {
            token_id: order.token_id,
            amount: order.size,
            price: order.price,
            side: order.side,
        };
        signer
            .build_market_order(wallet, &args, order.tick_size, &options)
            .await?
    } else {
        let args = OrderArgs {
            token_id: order.token_id,
            price: order.price,
            size: order.size,
            side: order.side,
        };
        signer
            .build_order(wallet, &args, order.tick_size, &options)
            .await?
    };

    info!(
        token_id = %order.token_id,
        side = %order.side,
        maker_amount = %signed.maker_amount,
        taker_amount = %signed.taker_amount,
        "Order signed"
    );
    Ok(signed)
}
