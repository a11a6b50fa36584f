//! Environment-driven configuration.
//!
//! Kept in one test: the process environment is shared between test threads.
use std::env;
use std::io::Write;
use std::time::Duration;

use client_core::{AppConfig, ClientError, ContractInterface};

const VARS: &[&str] = &[
    "PACKS_CONTRACT_ADDRESS",
    "PACKS_CONTRACT_ABI",
    "TRON_NETWORK",
    "PACKS_MINT_COST",
    "PACKS_CREDITS_PER_TRX",
    "PACKS_CATALOG_IDS",
    "PACKS_SETTLE_DELAY_MS",
    "PACKS_FEE_LIMIT",
];

fn clear() {
    for var in VARS {
        unsafe { env::remove_var(var) };
    }
}

fn set(key: &str, value: &str) {
    unsafe { env::set_var(key, value) };
}

#[test]
fn test_config_from_env() {
    clear();

    // Address is mandatory
    let err = AppConfig::from_env().unwrap_err();
    assert!(matches!(err, ClientError::Config(m) if m.contains("PACKS_CONTRACT_ADDRESS")));

    // Defaults with just an address
    set("PACKS_CONTRACT_ADDRESS", " TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t ");
    let config = AppConfig::from_env().expect("address alone is enough");
    assert_eq!(config.contract.address, "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t");
    assert_eq!(config.network.identifier, "shasta");
    assert!(ContractInterface::from_json(&config.contract.abi).is_ok());

    // Overrides
    let mut abi = tempfile::NamedTempFile::new().unwrap();
    write!(abi, "{}", client_core::BUNDLED_ABI).unwrap();

    set("PACKS_CONTRACT_ABI", abi.path().to_str().unwrap());
    set("TRON_NETWORK", "Nile");
    set("PACKS_MINT_COST", "8");
    set("PACKS_CREDITS_PER_TRX", "20");
    set("PACKS_CATALOG_IDS", "1,4, 7");
    set("PACKS_SETTLE_DELAY_MS", "500");
    set("PACKS_FEE_LIMIT", "2000000");

    let config = AppConfig::from_env().unwrap();
    assert_eq!(config.network.identifier, "nile");
    assert_eq!(config.economics.mint_cost, 8);
    assert_eq!(config.economics.credits_per_trx, 20);
    assert_eq!(config.sync.catalog_ids, vec![1, 4, 7]);
    assert_eq!(config.tx.settle_delay, Duration::from_millis(500));
    assert_eq!(config.tx.fee_limit, 2_000_000);

    set("PACKS_FEE_LIMIT", "0");
    assert!(matches!(
        AppConfig::from_env(),
        Err(ClientError::Config(m)) if m.contains("PACKS_FEE_LIMIT")
    ));
    set("PACKS_FEE_LIMIT", "2000000");

    // Unparseable numbers fall back to defaults; bad id lists do not
    set("PACKS_MINT_COST", "lots");
    assert_eq!(AppConfig::from_env().unwrap().economics.mint_cost, 5);

    set("PACKS_CATALOG_IDS", "1,x");
    assert!(matches!(
        AppConfig::from_env(),
        Err(ClientError::Config(_))
    ));
    set("PACKS_CATALOG_IDS", "1");

    // Missing ABI file
    set("PACKS_CONTRACT_ABI", "/nonexistent/pack_nft.json");
    let err = AppConfig::from_env().unwrap_err();
    assert!(matches!(err, ClientError::Config(m) if m.contains("ABI")));

    clear();
}
