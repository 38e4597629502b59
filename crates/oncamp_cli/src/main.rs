//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `oncamp_core` linkage and the vendor/product flow end to end.
//! - Keep output deterministic apart from store-assigned ids.
//!
//! Usage: `oncamp_cli [config.json]`. Without a config file the probe runs
//! against an in-memory store.

use oncamp_core::{CoreConfig, Product, Vendor, VendorService};
use std::error::Error;
use std::process::ExitCode;

const PROBE_VENDOR_ID: &str = "cli-probe";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    println!("oncamp_core ping={}", oncamp_core::ping());
    println!("oncamp_core version={}", oncamp_core::core_version());

    match run_probe().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("probe failed: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run_probe() -> Result<(), Box<dyn Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => CoreConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        None => CoreConfig::default(),
    };
    if oncamp_core::init_logging_from_config(&config)? {
        println!("logging level={}", config.effective_log_level());
    }

    let service = VendorService::from_config(config.open_store()?, &config);

    let vendor = Vendor {
        description: "Smoke probe vendor".to_string(),
        schools: vec!["Probe University".to_string()],
        ..Vendor::new("Probe Cafe", "Food")
    };
    let outcome = service.update_vendor_info(PROBE_VENDOR_ID, &vendor).await?;
    println!("vendor upsert outcome={outcome:?}");

    let product = Product {
        name: "Probe Latte".to_string(),
        category: "Drinks".to_string(),
        description: "Smoke probe product".to_string(),
        image: String::new(),
        price: 4,
    };
    let added = service.add_product(PROBE_VENDOR_ID, product).await?;

    let loaded = service.get_vendor(PROBE_VENDOR_ID).await?;
    println!("vendor={}", serde_json::to_string(&loaded)?);
    for item in service.fetch_all_products(PROBE_VENDOR_ID).await? {
        println!("product={}", serde_json::to_string(&item)?);
    }

    service.delete_product(PROBE_VENDOR_ID, added.id()).await?;
    Ok(())
}
