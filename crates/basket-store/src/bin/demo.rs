//! # Checkout Demo
//!
//! Walks a cart through one successful and one failed checkout against
//! the simulated storefront and prints the state after each step.
//!
//! ## Usage
//! ```bash
//! cargo run -p basket-store --bin demo
//!
//! # Use a specific config file
//! cargo run -p basket-store --bin demo -- --config ./basket.toml
//!
//! # More detail
//! RUST_LOG=trace cargo run -p basket-store --bin demo
//! ```

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use basket_core::{Money, Product, ProductCatalog};
use basket_store::{init_tracing, CartStore, SimulatedCheckout, StoreConfig, StoreResult};
use tracing::info;

fn catalog() -> ProductCatalog {
    vec![
        Product::new("APL-001", "Apples (1 lb)", Money::dollars(3, 0)),
        Product::new("BRD-001", "Sourdough Loaf", Money::dollars(5, 0)),
        Product::new("MLK-001", "Whole Milk", Money::dollars(4, 49)),
    ]
    .into_iter()
    .collect()
}

fn print_state(label: &str, store: &CartStore, catalog: &ProductCatalog) -> StoreResult<()> {
    let state = store.state();
    println!("── {label}");
    println!("   state:   {}", state.checkout_state);
    for (id, qty) in state.items.iter() {
        println!("   {id:<8} x{qty}");
    }
    println!("   items:   {}", store.memoized_num_items());
    println!("   total:   {}", store.total_price(catalog)?);
    if !state.error_message.is_empty() {
        println!("   error:   {}", state.error_message);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Basket Checkout Demo");
                println!();
                println!("Usage: demo [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --config <PATH>  Config file (default: platform config dir)");
                println!("  -h, --help           Show this help");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let config = StoreConfig::load_or_default(config_path);
    info!(
        quantity_policy = %config.cart.quantity_policy,
        concurrency = %config.checkout.concurrency,
        timeout_ms = config.checkout.timeout_ms,
        "Loaded store config"
    );

    let catalog = catalog();

    // Scenario 1: the storefront approves
    let store = CartStore::with_config(config.clone(), Arc::new(SimulatedCheckout::storefront()));
    store.add_to_cart("APL-001");
    store.add_to_cart("APL-001");
    store.add_to_cart("BRD-001");
    print_state("cart filled", &store, &catalog)?;

    let outcome = store.checkout_cart().await?;
    println!("   outcome: {outcome:?}");
    print_state("after approved checkout", &store, &catalog)?;

    // Scenario 2: the network is down
    let store = CartStore::with_config(
        config,
        Arc::new(SimulatedCheckout::failing(Duration::from_millis(200), "network down")),
    );
    store.add_to_cart("MLK-001");
    store.update_quantity("APL-001", 2)?;
    print_state("cart filled", &store, &catalog)?;

    let outcome = store.checkout_cart().await?;
    println!("   outcome: {outcome:?}");
    print_state("after failed checkout", &store, &catalog)?;

    println!();
    println!("{}", serde_json::to_string_pretty(&store.state())?);

    Ok(())
}
