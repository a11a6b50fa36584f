//! Snapshot reconstruction from contract reads.
mod common;

use client_core::{ClientError, TrxAmount};

use common::{Harness, OTHER_USER, USER};

#[tokio::test]
async fn test_new_account_has_an_empty_snapshot() {
    let h = Harness::new().await;
    let (session, snapshot) = h.client.connect().await.expect("connect should succeed");

    assert_eq!(session.address.as_str(), USER);
    assert!(session.connected);

    assert_eq!(snapshot.address.as_ref().map(|a| a.as_str()), Some(USER));
    assert_eq!(snapshot.staked_amount, TrxAmount::ZERO);
    assert_eq!(snapshot.bandwidth_credits, 0);
    assert!(snapshot.is_empty());
    assert!(!snapshot.can_mint(h.client.mint_cost()));
}

#[tokio::test]
async fn test_catalog_lists_only_existing_packs() {
    let h = Harness::connected().await;
    let snapshot = h.client.refresh().await.unwrap();

    let ids: Vec<_> = snapshot.catalog.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);
    assert!(snapshot.catalog.iter().all(|p| p.exists));
    assert_eq!(snapshot.catalog[1].price.to_string(), "25");

    // One detail read per configured catalog id
    assert_eq!(h.chain.call_count("getPackDetails"), 3);
}

#[tokio::test]
async fn test_refresh_is_idempotent() {
    let h = Harness::connected().await;
    h.client.stake("3").await.unwrap();
    h.client.purchase_pack("3", "25").await.unwrap();

    let first = h.client.refresh().await.unwrap();
    let second = h.client.refresh().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.packs.len(), 1);
}

#[tokio::test]
async fn test_failed_read_keeps_the_previous_snapshot() {
    let h = Harness::connected().await;
    h.client.stake("1").await.unwrap();
    let before = h.client.snapshot().await;

    h.sim.fail_reads("getStakeInfo");
    let err = h.client.refresh().await.unwrap_err();

    match err {
        ClientError::Sync(message) => assert!(message.contains("getStakeInfo")),
        other => panic!("expected Sync, got {other:?}"),
    }
    assert_eq!(h.client.snapshot().await, before);
}

#[tokio::test]
async fn test_owned_pack_detail_failure_fails_the_refresh() {
    let h = Harness::connected().await;
    h.client.stake("1").await.unwrap();
    h.client.purchase_pack("1", "10").await.unwrap();
    let before = h.client.snapshot().await;

    h.sim.fail_pack_reads(1);
    assert!(matches!(
        h.client.refresh().await,
        Err(ClientError::Sync(_))
    ));
    assert_eq!(h.client.snapshot().await, before);
}

#[tokio::test]
async fn test_catalog_failures_are_dropped() {
    let h = Harness::connected().await;
    h.sim.fail_pack_reads(3);

    let snapshot = h.client.refresh().await.expect("catalog failures are not fatal");
    let ids: Vec<_> = snapshot.catalog.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["1"]);
}

#[tokio::test]
async fn test_unknown_packs_and_nfts_are_filtered() {
    let h = Harness::connected().await;
    h.sim.grant_pack(USER, 2);
    h.sim.grant_pack(USER, 1);
    h.sim.grant_dangling_nft(USER, 99);

    let snapshot = h.client.refresh().await.unwrap();

    let packs: Vec<_> = snapshot.packs.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(packs, vec!["1"]);
    assert!(snapshot.nfts.is_empty());
    assert_eq!(h.chain.call_count("getNFTDetails"), 1);
}

#[tokio::test]
async fn test_snapshot_is_scoped_to_the_account() {
    let h = Harness::connected().await;
    h.client.stake("1").await.unwrap();
    h.sim.grant_pack(OTHER_USER, 1);

    let snapshot = h.client.snapshot().await;
    assert_eq!(snapshot.bandwidth_credits, 10);
    assert!(snapshot.packs.is_empty());
    assert!(snapshot.nfts.iter().all(|n| n.owner.as_str() == USER));
}

#[tokio::test]
async fn test_snapshot_serializes_for_display() {
    let h = Harness::connected().await;
    h.client.stake("1.5").await.unwrap();

    let json = serde_json::to_value(h.client.snapshot().await).unwrap();
    assert_eq!(json["bandwidth_credits"], 15);
    assert_eq!(json["address"], USER);
    assert_eq!(json["catalog"].as_array().map(Vec::len), Some(2));
}
