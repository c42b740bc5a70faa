//! Cluster and spore service behavior over an in-memory indexer.

use spore_client::testing::{CellBuilder, MemoryIndexer, default_lock};
use spore_client::{
    ChainContext, ClientError, ClusterService, QueryOptions, SHANNONS_PER_CKB, SporeConfig,
    SporeService,
};
use std::sync::Arc;

fn hex_id(byte: u8) -> String {
    format!("0x{}", format!("{:02x}", byte).repeat(32))
}

struct Fixture {
    indexer: Arc<MemoryIndexer>,
    clusters: ClusterService,
}

impl Fixture {
    fn new(indexer: MemoryIndexer) -> Self {
        let config = SporeConfig::testnet();
        let indexer = Arc::new(indexer);
        let spores = Arc::new(SporeService::with_context(ChainContext::with_indexer(
            config.clone(),
            indexer.clone(),
        )));
        let clusters =
            ClusterService::with_context(ChainContext::with_indexer(config, indexer.clone()), spores);
        Self { indexer, clusters }
    }
}

#[tokio::test]
async fn test_get_empty_id_skips_indexer() {
    let fixture = Fixture::new(MemoryIndexer::new());

    assert!(fixture.clusters.get("").await.unwrap().is_none());
    assert!(fixture.clusters.spores().get("", true).await.unwrap().is_none());
    assert_eq!(fixture.clusters.get_capacity_margin("").await.unwrap(), 0);
    assert_eq!(fixture.indexer.call_count(), 0);
}

#[tokio::test]
async fn test_get_unknown_cluster() {
    let fixture = Fixture::new(MemoryIndexer::new());
    assert!(fixture.clusters.get(&hex_id(1)).await.unwrap().is_none());
    assert_eq!(fixture.indexer.call_count(), 1);
}

#[tokio::test]
async fn test_get_rejects_non_hex_id() {
    let fixture = Fixture::new(MemoryIndexer::new());
    assert!(matches!(
        fixture.clusters.get("my-cluster").await,
        Err(ClientError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn test_list_is_newest_first_and_limited() {
    let config = SporeConfig::testnet();
    let fixture = Fixture::new(MemoryIndexer::with_cells((1..=5).map(|i| {
        CellBuilder::cluster(&config, [i; 32])
            .cluster_data(&format!("cluster {}", i), "")
            .build()
    })));

    let page = fixture.clusters.list(QueryOptions::limit(2)).await.unwrap();
    let names: Vec<_> = page.items.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["cluster 5", "cluster 4"]);
    assert_eq!(page.collected, 2);

    let page = fixture
        .clusters
        .list(QueryOptions::limit(2).with_skip(3))
        .await
        .unwrap();
    let names: Vec<_> = page.items.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["cluster 2", "cluster 1"]);

    let all = fixture.clusters.list(QueryOptions::default()).await.unwrap();
    assert_eq!(all.items.len(), 5);
}

#[tokio::test]
async fn test_list_zero_limit() {
    let config = SporeConfig::testnet();
    let fixture = Fixture::new(MemoryIndexer::with_cells([
        CellBuilder::cluster(&config, [1; 32]).build(),
    ]));

    let page = fixture.clusters.list(QueryOptions::limit(0)).await.unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.collected, 0);
}

#[tokio::test]
async fn test_list_by_lock() {
    let config = SporeConfig::testnet();
    let fixture = Fixture::new(MemoryIndexer::with_cells([
        CellBuilder::cluster(&config, [1; 32]).lock(default_lock(1)).build(),
        CellBuilder::cluster(&config, [2; 32]).lock(default_lock(2)).build(),
        CellBuilder::cluster(&config, [3; 32]).lock(default_lock(1)).build(),
    ]));

    let owned = fixture
        .clusters
        .list_by_lock(&default_lock(1), QueryOptions::default())
        .await
        .unwrap();
    let ids: Vec<_> = owned.items.iter().map(|c| c.id.clone()).collect();
    assert_eq!(ids, vec![hex_id(3), hex_id(1)]);
    assert!(owned.items.iter().all(|c| c.owner() == &default_lock(1)));
}

#[tokio::test]
async fn test_spore_list_filters_by_cluster() {
    let config = SporeConfig::testnet();
    let fixture = Fixture::new(MemoryIndexer::with_cells([
        CellBuilder::spore(&config, [1; 32]).in_cluster([0xa1; 32]).build(),
        CellBuilder::spore(&config, [2; 32]).build(),
        CellBuilder::spore(&config, [3; 32]).in_cluster([0xa2; 32]).build(),
        CellBuilder::spore(&config, [4; 32]).in_cluster([0xa1; 32]).build(),
    ]));
    let spores = fixture.clusters.spores();

    let in_a1 = spores
        .list(&[hex_id(0xa1)], QueryOptions::default())
        .await
        .unwrap();
    let ids: Vec<_> = in_a1.items.iter().map(|s| s.id.clone()).collect();
    assert_eq!(ids, vec![hex_id(4), hex_id(1)]);
    // every spore was scanned even though only two were kept
    assert_eq!(in_a1.collected, 4);

    let everything = spores.list(&[], QueryOptions::default()).await.unwrap();
    assert_eq!(everything.items.len(), 4);
}

#[tokio::test]
async fn test_spore_content_is_opt_in() {
    let config = SporeConfig::testnet();
    let fixture = Fixture::new(MemoryIndexer::with_cells([CellBuilder::spore(&config, [1; 32])
        .content("text/plain", b"hello")
        .build()]));
    let spores = fixture.clusters.spores();

    let bare = spores.get(&hex_id(1), false).await.unwrap().unwrap();
    assert!(bare.content.is_none());
    assert_eq!(bare.content_type, "text/plain");

    let full = spores.get(&hex_id(1), true).await.unwrap().unwrap();
    assert_eq!(full.content.unwrap().as_bytes(), b"hello");
}

#[tokio::test]
async fn test_recent_joins_spores_to_clusters() {
    let config = SporeConfig::testnet();
    let fixture = Fixture::new(MemoryIndexer::with_cells([
        CellBuilder::cluster(&config, [0xa1; 32]).cluster_data("A", "").build(),
        CellBuilder::cluster(&config, [0xa2; 32]).cluster_data("B", "").build(),
        CellBuilder::spore(&config, [1; 32]).in_cluster([0xa1; 32]).build(),
        CellBuilder::spore(&config, [2; 32]).in_cluster([0xa2; 32]).build(),
        CellBuilder::spore(&config, [3; 32]).build(),
        CellBuilder::spore(&config, [4; 32]).in_cluster([0xa1; 32]).build(),
        // belongs to a cluster with no live cell
        CellBuilder::spore(&config, [5; 32]).in_cluster([0xee; 32]).build(),
    ]));

    let recent = fixture.clusters.recent(10).await.unwrap();
    let names: Vec<_> = recent.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B"]);

    for cluster in &recent {
        let spores = cluster.spores.as_ref().unwrap();
        assert!(!spores.is_empty());
        assert!(spores.iter().all(|s| s.cluster_id.as_deref() == Some(cluster.id.as_str())));
        assert!(spores.iter().all(|s| s.content.is_none()));
    }
    let a_spores: Vec<_> = recent[0]
        .spores
        .as_ref()
        .unwrap()
        .iter()
        .map(|s| s.id.clone())
        .collect();
    assert_eq!(a_spores, vec![hex_id(4), hex_id(1)]);
}

#[tokio::test]
async fn test_recent_without_clustered_spores() {
    let config = SporeConfig::testnet();
    let fixture = Fixture::new(MemoryIndexer::with_cells([
        CellBuilder::cluster(&config, [0xa1; 32]).build(),
        CellBuilder::spore(&config, [1; 32]).build(),
    ]));

    assert!(fixture.clusters.recent(10).await.unwrap().is_empty());
    // only the recent-spores scan ran
    assert_eq!(fixture.indexer.call_count(), 1);
}

#[tokio::test]
async fn test_capacity_margin() {
    let config = SporeConfig::testnet();
    let cell = CellBuilder::cluster(&config, [1; 32])
        .cluster_data("A", "")
        .build();
    let occupied = spore_client::occupied_capacity(&cell.output, cell.output_data.len());
    let fixture = Fixture::new(MemoryIndexer::with_cells([
        CellBuilder::cluster(&config, [1; 32])
            .cluster_data("A", "")
            .capacity(occupied + 5 * SHANNONS_PER_CKB)
            .build(),
        CellBuilder::cluster(&config, [2; 32]).capacity(0).build(),
    ]));

    assert_eq!(
        fixture.clusters.get_capacity_margin(&hex_id(1)).await.unwrap(),
        5 * SHANNONS_PER_CKB
    );
    assert_eq!(fixture.clusters.get_capacity_margin(&hex_id(2)).await.unwrap(), 0);
    assert_eq!(fixture.clusters.get_capacity_margin(&hex_id(9)).await.unwrap(), 0);
}

#[tokio::test]
async fn test_indexer_failure_propagates() {
    let fixture = Fixture::new(MemoryIndexer::new());
    fixture.indexer.fail_with("indexer down");

    match fixture.clusters.list(QueryOptions::default()).await {
        Err(ClientError::Rpc { message, .. }) => assert_eq!(message, "indexer down"),
        other => panic!("Expected RPC error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_set_context_swaps_indexer() {
    let config = SporeConfig::testnet();
    let fixture = Fixture::new(MemoryIndexer::new());
    assert!(fixture.clusters.list(QueryOptions::default()).await.unwrap().items.is_empty());

    let other = Arc::new(MemoryIndexer::with_cells([
        CellBuilder::cluster(&config, [1; 32]).build(),
    ]));
    fixture
        .clusters
        .set_context(ChainContext::with_indexer(config, other.clone()));

    assert_eq!(
        fixture.clusters.list(QueryOptions::default()).await.unwrap().items.len(),
        1
    );
    assert_eq!(other.call_count(), 1);
}

#[tokio::test]
async fn test_set_context_switches_recent_join() {
    let config = SporeConfig::testnet();
    let fixture = Fixture::new(MemoryIndexer::new());

    let other = Arc::new(MemoryIndexer::with_cells([
        CellBuilder::cluster(&config, [0xa1; 32]).cluster_data("A", "").build(),
        CellBuilder::spore(&config, [1; 32]).in_cluster([0xa1; 32]).build(),
    ]));
    fixture
        .clusters
        .set_context(ChainContext::with_indexer(config, other.clone()));

    let recent = fixture.clusters.recent(10).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].name, "A");
    assert_eq!(recent[0].spores.as_ref().unwrap().len(), 1);
    assert_eq!(fixture.indexer.call_count(), 0);
    // recent spores, the cluster, and its members
    assert_eq!(other.call_count(), 3);
}

#[tokio::test]
async fn test_set_config_switches_spore_service() {
    let fixture = Fixture::new(MemoryIndexer::new());
    let mut config = SporeConfig::testnet();
    config.ckb_indexer_url = "http://127.0.0.1:8116".to_string();

    fixture.clusters.set_config(config.clone()).unwrap();
    assert_eq!(fixture.clusters.config(), config);
    assert_eq!(fixture.clusters.spores().config(), config);
}
