//! Live API tests. Run with: `cargo test --features online -- --nocapture`
#![cfg(feature = "online")]

use rcountries::{Client, clean, normalize};

#[test]
fn fetch_europe() {
    let fetched = Client::default().fetch_region("europe").unwrap();
    assert_eq!(fetched.status, 200);
    assert!(fetched.records.len() > 40);
    assert!(
        fetched
            .records
            .iter()
            .all(|r| r.get("region").and_then(|v| v.as_str()) == Some("Europe"))
    );
}

#[test]
fn live_payload_cleans() {
    let fetched = Client::default().fetch_region("europe").unwrap();
    let out = clean::clean(&normalize::flatten_records(&fetched.records)).unwrap();
    assert!(!out.rows.is_empty());
    assert!(out.rows.iter().all(|r| r.area > 0.0));
}
