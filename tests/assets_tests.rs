//! Unit tests for the asset registry and amount codec.

use rust_decimal::Decimal;
use zec_intents::{from_on_chain, to_on_chain, Asset, AssetRegistry, IntentError};

fn registry() -> AssetRegistry {
    AssetRegistry::with_defaults()
}

/// What is tested: resolve() finds every built-in asset
/// Why: The default table must cover NEAR, ZEC and USDC
#[test]
fn test_resolve_builtin_assets() {
    let registry = registry();
    for symbol in ["NEAR", "ZEC", "USDC"] {
        let asset = registry.resolve(symbol).unwrap();
        assert_eq!(asset.symbol, symbol);
    }
}

/// What is tested: resolve() fails with UnsupportedAsset for unknown symbols
/// Why: Unsupported assets must be rejected before any network call
#[test]
fn test_resolve_unknown_symbol() {
    let registry = registry();
    let result = registry.resolve("DOGE");
    assert!(matches!(result, Err(IntentError::UnsupportedAsset(s)) if s == "DOGE"));
}

/// What is tested: asset_id() special-cases the native asset
/// Why: The protocol addresses native NEAR as "near", tokens as nep141 references
#[test]
fn test_protocol_asset_ids() {
    let registry = registry();
    assert_eq!(registry.resolve("NEAR").unwrap().asset_id(), "near");
    assert_eq!(
        registry.resolve("ZEC").unwrap().asset_id(),
        "nep141:zcash.factory.bridge.near"
    );
    assert_eq!(
        registry.resolve("USDC").unwrap().asset_id(),
        "nep141:a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48.factory.bridge.near"
    );
}

/// What is tested: shielding capability flags on the built-in table
/// Why: Privacy decisions key off this flag
#[test]
fn test_shielded_flags() {
    let registry = registry();
    assert!(registry.resolve("ZEC").unwrap().shielded);
    assert!(!registry.resolve("NEAR").unwrap().shielded);
    assert!(!registry.resolve("USDC").unwrap().shielded);
}

/// What is tested: to_on_chain() converts 0.5 NEAR exactly
/// Why: 24-decimal amounts must not pick up binary float drift
#[test]
fn test_to_on_chain_near() {
    let registry = registry();
    let near = registry.resolve("NEAR").unwrap();
    let raw = to_on_chain("0.5".parse::<Decimal>().unwrap(), near).unwrap();
    assert_eq!(raw, "500000000000000000000000");
}

/// What is tested: to_on_chain() at ZEC and USDC precision
/// Why: Conversion must respect per-asset decimals
#[test]
fn test_to_on_chain_token_precisions() {
    let registry = registry();
    let zec = registry.resolve("ZEC").unwrap();
    let usdc = registry.resolve("USDC").unwrap();
    assert_eq!(to_on_chain(Decimal::from(2), zec).unwrap(), "200000000");
    assert_eq!(
        to_on_chain("1.25".parse::<Decimal>().unwrap(), usdc).unwrap(),
        "1250000"
    );
}

/// What is tested: to_on_chain() truncates excess fractional digits toward zero
/// Why: The codec documents truncation as its single rounding mode
#[test]
fn test_to_on_chain_truncates() {
    let registry = registry();
    let usdc = registry.resolve("USDC").unwrap();
    // 6 decimals: the 7th digit is dropped, not rounded up
    let raw = to_on_chain("0.12345678".parse::<Decimal>().unwrap(), usdc).unwrap();
    assert_eq!(raw, "123456");
}

/// What is tested: to_on_chain() rejects non-positive amounts
/// Why: Amount validation happens locally, before anything is sent
#[test]
fn test_to_on_chain_rejects_non_positive() {
    let registry = registry();
    let near = registry.resolve("NEAR").unwrap();
    assert!(matches!(
        to_on_chain(Decimal::ZERO, near),
        Err(IntentError::InvalidAmount(_))
    ));
    assert!(matches!(
        to_on_chain(Decimal::from(-1), near),
        Err(IntentError::InvalidAmount(_))
    ));
}

/// What is tested: from_on_chain() recovers the human amount
/// Why: Round trips must stay within one smallest denomination unit
#[test]
fn test_round_trip_all_assets() {
    let registry = registry();
    for symbol in ["NEAR", "ZEC", "USDC"] {
        let asset = registry.resolve(symbol).unwrap();
        for text in ["0.5", "1", "2.25", "123.456"] {
            let amount: Decimal = text.parse().unwrap();
            let raw = to_on_chain(amount, asset).unwrap();
            let recovered = from_on_chain(&raw, asset).unwrap();
            assert_eq!(recovered, amount, "{} {}", text, symbol);
        }
    }
}

/// What is tested: from_on_chain() rejects non-integer input
/// Why: On-chain amounts are integer strings by contract
#[test]
fn test_from_on_chain_rejects_garbage() {
    let registry = registry();
    let near = registry.resolve("NEAR").unwrap();
    assert!(matches!(
        from_on_chain("1.5", near),
        Err(IntentError::InvalidAmount(_))
    ));
    assert!(matches!(
        from_on_chain("abc", near),
        Err(IntentError::InvalidAmount(_))
    ));
}

/// What is tested: from_on_chain() handles balances beyond Decimal's mantissa
/// Why: Oversized balances lose sub-unit digits but never fail on magnitude
#[test]
fn test_from_on_chain_large_balance() {
    let registry = registry();
    let near = registry.resolve("NEAR").unwrap();
    // 100,000 NEAR in yoctoNEAR: 29 digits, one more than Decimal holds
    let recovered = from_on_chain("100000000000000000000000000000", near).unwrap();
    assert_eq!(recovered, Decimal::from(100_000));
}

/// What is tested: from_assets() rejects duplicate symbols
/// Why: The symbol is the unique registry key
#[test]
fn test_registry_rejects_duplicates() {
    let mut assets = zec_intents::default_assets();
    assets.push(assets[0].clone());
    assert!(matches!(
        AssetRegistry::from_assets(assets),
        Err(IntentError::Config(_))
    ));
}

/// What is tested: from_assets() rejects a second native asset
/// Why: Exactly one asset may claim the bare native identifier
#[test]
fn test_registry_rejects_two_natives() {
    let mut assets = zec_intents::default_assets();
    assets.push(Asset {
        symbol: "WNEAR".to_string(),
        token_id: "wrap2.near".to_string(),
        omft: None,
        decimals: 24,
        shielded: false,
        native: true,
    });
    assert!(matches!(
        AssetRegistry::from_assets(assets),
        Err(IntentError::Config(_))
    ));
}
