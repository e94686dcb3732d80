//! Unit tests for the solver bus client and option selection.

use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zec_intents::{
    select_best_option, AssetRegistry, CommitmentBuilder, IntentError, IntentRequest,
    SolverBusClient, SwapOption,
};

mod helpers;
use helpers::test_account;

fn quote_request() -> zec_intents::QuoteRequest {
    let registry = AssetRegistry::with_defaults();
    IntentRequest::new(&registry)
        .set_asset_in("NEAR", "0.5".parse::<Decimal>().unwrap())
        .unwrap()
        .set_asset_out("ZEC", None)
        .unwrap()
        .serialize()
        .unwrap()
}

fn signed_commitment() -> zec_intents::SignedCommitment {
    let registry = AssetRegistry::with_defaults();
    let near = registry.resolve("NEAR").unwrap();
    let zec = registry.resolve("ZEC").unwrap();
    CommitmentBuilder::new("intents.near", 120_000)
        .build(
            &test_account(),
            near,
            "0.5".parse::<Decimal>().unwrap(),
            zec,
            "15000000",
            None,
        )
        .unwrap()
}

// ----------------------------------------------------------------------------
// fetch_options() tests
// ----------------------------------------------------------------------------

/// What is tested: fetch_options() parses a successful quote response
/// Why: The client must unwrap the {result: [...]} envelope
#[test]
fn test_fetch_options_success() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (_mock_server, base_url) = rt.block_on(async {
        let mock_server = MockServer::start().await;

        let response = json!({
            "result": [
                {"amount_out": "12000000", "solver_id": "solver-a"},
                {"amount_out": "15000000", "solver_id": "solver-b"}
            ]
        });

        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_partial_json(json!({"method": "intents_getQuotes"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(response))
            .mount(&mock_server)
            .await;

        let base_url = mock_server.uri().to_string();
        (mock_server, base_url)
    });

    let client = SolverBusClient::new(base_url);
    let options = client.fetch_options(&quote_request());

    assert_eq!(options.len(), 2);
    assert_eq!(options[0].amount_out, "12000000");
    assert_eq!(options[1].extra["solver_id"], json!("solver-b"));
}

/// What is tested: fetch_options() sends the {method, params, id} envelope
/// Why: The relay expects the request nested under params with an id
#[test]
fn test_fetch_options_envelope_shape() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (mock_server, base_url) = rt.block_on(async {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": []})))
            .mount(&mock_server)
            .await;

        let base_url = mock_server.uri().to_string();
        (mock_server, base_url)
    });

    let client = SolverBusClient::new(base_url);
    let _ = client.fetch_options(&quote_request());

    let requests = rt
        .block_on(async { mock_server.received_requests().await })
        .unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["method"], json!("intents_getQuotes"));
    assert_eq!(body["id"], json!(1));
    assert_eq!(body["params"]["assets"]["in"], json!("near"));
    assert_eq!(
        body["params"]["assets"]["out"],
        json!("nep141:zcash.factory.bridge.near")
    );
    assert_eq!(body["params"]["amounts"]["in"], json!("500000000000000000000000"));
}

/// What is tested: fetch_options() returns an empty list on an empty result
/// Why: An empty array is valid "no liquidity", not an error
#[test]
fn test_fetch_options_empty() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (_mock_server, base_url) = rt.block_on(async {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": []})))
            .mount(&mock_server)
            .await;

        let base_url = mock_server.uri().to_string();
        (mock_server, base_url)
    });

    let client = SolverBusClient::new(base_url);
    let options = client.fetch_options(&quote_request());
    assert!(options.is_empty());
}

/// What is tested: fetch_options() degrades to empty on a server error
/// Why: Quote-fetch transport faults collapse to "no liquidity" for callers
#[test]
fn test_fetch_options_server_error_degrades() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (_mock_server, base_url) = rt.block_on(async {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&mock_server)
            .await;

        let base_url = mock_server.uri().to_string();
        (mock_server, base_url)
    });

    let client = SolverBusClient::new(base_url);
    let options = client.fetch_options(&quote_request());
    assert!(options.is_empty());
}

/// What is tested: fetch_options() degrades to empty when the relay is unreachable
/// Why: Connection failures are a market condition for quoting, not a crash
#[test]
fn test_fetch_options_unreachable_degrades() {
    // Port 1 is never listening
    let client = SolverBusClient::new("http://127.0.0.1:1");
    let options = client.fetch_options(&quote_request());
    assert!(options.is_empty());
}

/// What is tested: fetch_options() degrades to empty on a malformed body
/// Why: A relay bug must not abort the swap pipeline with a parse panic
#[test]
fn test_fetch_options_malformed_body_degrades() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (_mock_server, base_url) = rt.block_on(async {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"result": {"not": "a list"}})),
            )
            .mount(&mock_server)
            .await;

        let base_url = mock_server.uri().to_string();
        (mock_server, base_url)
    });

    let client = SolverBusClient::new(base_url);
    let options = client.fetch_options(&quote_request());
    assert!(options.is_empty());
}

// ----------------------------------------------------------------------------
// publish_intent() tests
// ----------------------------------------------------------------------------

/// What is tested: publish_intent() returns the relay result on success
/// Why: Callers receive the relay's verdict verbatim
#[test]
fn test_publish_intent_success() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (_mock_server, base_url) = rt.block_on(async {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_partial_json(json!({"method": "intents_publishIntent"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"result": {"status": "OK"}})),
            )
            .mount(&mock_server)
            .await;

        let base_url = mock_server.uri().to_string();
        (mock_server, base_url)
    });

    let client = SolverBusClient::new(base_url);
    let result = client.publish_intent(&signed_commitment()).unwrap();
    assert_eq!(result["status"], json!("OK"));
}

/// What is tested: publish_intent() fails loudly on a relay error status
/// Why: A failed publish may leave a commitment in flight; no silent degrade
#[test]
fn test_publish_intent_server_error() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (_mock_server, base_url) = rt.block_on(async {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&mock_server)
            .await;

        let base_url = mock_server.uri().to_string();
        (mock_server, base_url)
    });

    let client = SolverBusClient::new(base_url);
    let result = client.publish_intent(&signed_commitment());
    match result {
        Err(IntentError::Publish(e)) => {
            let text = format!("{:#}", e);
            assert!(text.contains("502"), "unexpected error text: {}", text);
        }
        other => panic!("expected Publish error, got {:?}", other.map(|_| ())),
    }
}

/// What is tested: publish_intent() surfaces a relay-reported error object
/// Why: An enveloped error is a failure even with a 200 status
#[test]
fn test_publish_intent_enveloped_error() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (_mock_server, base_url) = rt.block_on(async {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"error": "nonce already used"})),
            )
            .mount(&mock_server)
            .await;

        let base_url = mock_server.uri().to_string();
        (mock_server, base_url)
    });

    let client = SolverBusClient::new(base_url);
    let result = client.publish_intent(&signed_commitment());
    match result {
        Err(IntentError::Publish(e)) => {
            assert!(format!("{:#}", e).contains("nonce already used"));
        }
        other => panic!("expected Publish error, got {:?}", other.map(|_| ())),
    }
}

// ----------------------------------------------------------------------------
// select_best_option() tests
// ----------------------------------------------------------------------------

fn option(amount_out: &str) -> SwapOption {
    SwapOption {
        amount_out: amount_out.to_string(),
        extra: serde_json::Map::new(),
    }
}

/// What is tested: select_best_option() maximizes the output amount
/// Why: The winning quote is the one paying out the most
#[test]
fn test_select_best_option_max() {
    let options = vec![option("12000000"), option("15000000"), option("9000000")];
    let best = select_best_option(&options).unwrap();
    assert_eq!(best.amount_out, "15000000");
}

/// What is tested: ties keep the first maximal element
/// Why: Selection must be deterministic under equal amounts
#[test]
fn test_select_best_option_tie_keeps_first() {
    let mut first = option("15000000");
    first
        .extra
        .insert("solver_id".to_string(), json!("solver-a"));
    let mut second = option("15000000");
    second
        .extra
        .insert("solver_id".to_string(), json!("solver-b"));

    let options = vec![first, second];
    let best = select_best_option(&options).unwrap();
    assert_eq!(best.extra["solver_id"], json!("solver-a"));
}

/// What is tested: numeric comparison, not lexicographic
/// Why: "900" must lose to "15000000" despite sorting higher as a string
#[test]
fn test_select_best_option_numeric() {
    let options = vec![option("900"), option("15000000")];
    let best = select_best_option(&options).unwrap();
    assert_eq!(best.amount_out, "15000000");
}

/// What is tested: select_best_option() fails with NoOptions on empty input
/// Why: Defensive guard; NoLiquidity should normally be raised first
#[test]
fn test_select_best_option_empty() {
    let result = select_best_option(&[]);
    assert!(matches!(result, Err(IntentError::NoOptions)));
}

/// What is tested: unparsable amounts rank lowest but never panic
/// Why: A single bad quote must not break selection
#[test]
fn test_select_best_option_unparsable_ranks_lowest() {
    let options = vec![option("not-a-number"), option("100")];
    let best = select_best_option(&options).unwrap();
    assert_eq!(best.amount_out, "100");
}
