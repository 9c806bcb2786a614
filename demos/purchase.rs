//! Prepare (and optionally execute) a purchase from the command line
//!
//! Run with: cargo run --example purchase
//!
//! Requires PRIVATE_KEY, MINT_EXTENSION, MINT_CREATOR and MINT_INSTANCE_ID.
//! Optional: MINT_KIND (edition | blind), MINT_NETWORK (default 8453), MINT_QUANTITY
//! (default 1), MINT_EXECUTE (submit the plan when set).

use eyre::{eyre, WrapErr};
use mint_sdk::{
    Account, EngineConfig, HttpRateSource, LocalAccount, PreparedPurchase, Product, ProductData,
    PublicProvider, PurchaseParams, PurchasePreparer, Receipt, StepCallbacks, StepExecutor,
    StepStatus, TransactionStep,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

struct ConsoleProgress;

impl StepCallbacks for ConsoleProgress {
    fn on_status(&self, step: &TransactionStep, status: StepStatus) {
        println!("  [{}] {}", status, step.name());
    }

    fn on_submitted(&self, _step: &TransactionStep, hash: alloy::primitives::TxHash) {
        println!("  submitted {}", hash);
    }

    fn on_confirmed(&self, _step: &TransactionStep, receipt: &Receipt) {
        if receipt.is_synthetic() {
            println!("  already done, nothing sent");
        } else {
            println!("  confirmed in block {:?}", receipt.block_number);
        }
    }
}

fn env(name: &str) -> eyre::Result<String> {
    std::env::var(name).wrap_err_with(|| format!("{} must be set", name))
}

fn print_plan(purchase: &PreparedPurchase) {
    println!("\n========================================");
    if let Some(reason) = &purchase.ineligibility_reason {
        println!("Not eligible: {} ({})", reason.message, reason.code);
    }
    for missing in &purchase.missing_funds {
        println!("Missing: {}", missing);
    }
    let costs = purchase.cost.per_step.iter().zip(&purchase.cost.per_step_gas);
    for (step, (cost, gas)) in purchase.steps.iter().zip(costs) {
        println!(
            "  {} -> {} + {} gas (limit {})",
            step.name(),
            cost.native,
            gas,
            step.raw_transaction().gas_estimate
        );
    }
    let total = &purchase.cost.total;
    print!("Total: {}", total.native);
    if let Some(usd) = total.native.formatted_usd() {
        print!(" (${})", usd);
    }
    for token in &total.tokens {
        print!(" + {}", token);
    }
    println!("\nGas: {}", purchase.cost.gas);
    println!("========================================");
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let network_id: u64 = std::env::var("MINT_NETWORK")
        .unwrap_or_else(|_| "8453".to_string())
        .parse()?;
    let quantity: u32 = std::env::var("MINT_QUANTITY")
        .unwrap_or_else(|_| "1".to_string())
        .parse()?;
    let extension = env("MINT_EXTENSION")?.parse()?;
    let creator = env("MINT_CREATOR")?.parse()?;
    let instance_id = env("MINT_INSTANCE_ID")?.parse()?;

    let config = EngineConfig::from_env()?;
    let provider = PublicProvider::from_config(&config)?;
    let account = LocalAccount::from_config(env("PRIVATE_KEY")?, &config, network_id)?;
    println!("Connected wallet: {}", account.address());

    let data = ProductData::new("Demo product", network_id);
    let product = match std::env::var("MINT_KIND").as_deref() {
        Ok("blind") => Product::blind_mint(extension, creator, instance_id, data),
        Ok("edition") | Err(_) => Product::edition(extension, creator, instance_id, data),
        Ok(other) => return Err(eyre!("Unknown MINT_KIND: {}", other)),
    };

    let preparer = PurchasePreparer::new(provider.clone(), config.clone())
        .with_rate_source(Arc::new(HttpRateSource::new()?));
    let params = PurchaseParams::new(account.address(), quantity).with_balance_check(account.address());
    let mut purchase = preparer.prepare(&product, params).await?;
    print_plan(&purchase);

    if std::env::var("MINT_EXECUTE").is_err() || !purchase.is_eligible {
        return Ok(());
    }

    let receipts = StepExecutor::new(provider, &config)
        .execute_all(&mut purchase, &account, Some(&ConsoleProgress), 1)
        .await?;
    for order in receipts.iter().filter_map(|r| r.order.as_ref()) {
        for item in &order.items {
            match item.token_id {
                Some(id) => println!("Minted {} x token #{}", item.quantity, id),
                None => println!("Reserved {} (revealed later)", item.quantity),
            }
        }
    }
    Ok(())
}
