//! 통합 테스트 -- 전체 열거 플로우 검증
//!
//! family 목록 → family 상세 → plugin 상세 → 출력 스트림 시나리오를
//! 인메모리 카탈로그와 실제 채널 통신으로 테스트합니다.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use ironscan_core::catalog::PluginCatalog;
use ironscan_core::error::CatalogError;
use ironscan_core::types::{FamilyRef, PluginAttribute, PluginRecord, PluginRef};
use ironscan_enumerator::{EnumeratorConfig, EnumeratorError, PluginEnumerator};

const TEST_TIMEOUT: Duration = Duration::from_secs(10);

// 인메모리 카탈로그
mod mock {
    use super::*;

    /// 동시 호출 수의 최대치를 기록하는 카운터
    #[derive(Default)]
    pub struct InFlight {
        current: AtomicUsize,
        max: AtomicUsize,
    }

    impl InFlight {
        pub fn enter(&self) -> InFlightGuard<'_> {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.max.fetch_max(now, Ordering::SeqCst);
            InFlightGuard { counter: self }
        }

        pub fn max(&self) -> usize {
            self.max.load(Ordering::SeqCst)
        }
    }

    pub struct InFlightGuard<'a> {
        counter: &'a InFlight,
    }

    impl Drop for InFlightGuard<'_> {
        fn drop(&mut self) {
            self.counter.current.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    pub struct TestCatalog {
        families: Vec<(i64, Vec<i64>)>,
        failing_families: HashSet<i64>,
        failing_plugins: HashSet<i64>,
        listing_fails: bool,
        family_delay: Duration,
        slow_families: HashMap<i64, Duration>,
        plugin_delay: Duration,
        pub list_calls: AtomicUsize,
        pub family_calls: AtomicUsize,
        pub plugin_calls: AtomicUsize,
        pub family_in_flight: InFlight,
        pub plugin_in_flight: InFlight,
    }

    impl TestCatalog {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn family(mut self, id: i64, plugins: impl IntoIterator<Item = i64>) -> Self {
            self.families.push((id, plugins.into_iter().collect()));
            self
        }

        pub fn failing_family(mut self, id: i64) -> Self {
            self.failing_families.insert(id);
            self
        }

        pub fn failing_plugin(mut self, id: i64) -> Self {
            self.failing_plugins.insert(id);
            self
        }

        pub fn listing_fails(mut self) -> Self {
            self.listing_fails = true;
            self
        }

        pub fn family_delay(mut self, delay: Duration) -> Self {
            self.family_delay = delay;
            self
        }

        /// 특정 family만 지연시킵니다. `family_delay`보다 우선합니다.
        pub fn slow_family(mut self, id: i64, delay: Duration) -> Self {
            self.slow_families.insert(id, delay);
            self
        }

        pub fn plugin_delay(mut self, delay: Duration) -> Self {
            self.plugin_delay = delay;
            self
        }
    }

    impl PluginCatalog for TestCatalog {
        async fn list_families(&self) -> Result<Vec<FamilyRef>, CatalogError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if self.listing_fails {
                return Err(CatalogError::Status {
                    status: 401,
                    body: "Invalid Credentials".to_owned(),
                });
            }
            Ok(self
                .families
                .iter()
                .map(|(id, plugins)| FamilyRef {
                    id: *id,
                    name: format!("family-{id}"),
                    count: plugins.len() as u64,
                })
                .collect())
        }

        async fn family_plugins(&self, family_id: i64) -> Result<Vec<PluginRef>, CatalogError> {
            self.family_calls.fetch_add(1, Ordering::SeqCst);
            let _guard = self.family_in_flight.enter();
            let delay = self
                .slow_families
                .get(&family_id)
                .copied()
                .unwrap_or(self.family_delay);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if self.failing_families.contains(&family_id) {
                return Err(CatalogError::Transport("connection reset".to_owned()));
            }
            let plugins = self
                .families
                .iter()
                .find(|(id, _)| *id == family_id)
                .map(|(_, plugins)| plugins.clone())
                .unwrap_or_default();
            Ok(plugins
                .into_iter()
                .map(|id| PluginRef::new(id, family_id))
                .collect())
        }

        async fn plugin_details(&self, plugin_id: i64) -> Result<PluginRecord, CatalogError> {
            self.plugin_calls.fetch_add(1, Ordering::SeqCst);
            let _guard = self.plugin_in_flight.enter();
            if !self.plugin_delay.is_zero() {
                tokio::time::sleep(self.plugin_delay).await;
            }
            if self.failing_plugins.contains(&plugin_id) {
                return Err(CatalogError::Status {
                    status: 500,
                    body: "internal error".to_owned(),
                });
            }
            Ok(PluginRecord {
                id: plugin_id,
                name: format!("plugin-{plugin_id}"),
                family_name: "test".to_owned(),
                attributes: vec![PluginAttribute {
                    name: "risk_factor".to_owned(),
                    value: "High".to_owned(),
                }],
            })
        }
    }
}

use mock::TestCatalog;

fn config(workers: usize, id_queue: usize, output: usize, family_concurrency: usize) -> EnumeratorConfig {
    EnumeratorConfig {
        workers,
        id_queue_capacity: id_queue,
        output_capacity: output,
        family_concurrency,
    }
}

async fn run_to_completion(
    catalog: Arc<TestCatalog>,
    config: EnumeratorConfig,
) -> Vec<PluginRecord> {
    let enumerator = PluginEnumerator::with_catalog(catalog, config).unwrap();
    let stream = enumerator.enumerate().await.unwrap();
    tokio::time::timeout(TEST_TIMEOUT, stream.collect_all())
        .await
        .expect("enumeration should terminate")
}

fn counts(records: &[PluginRecord]) -> HashMap<i64, usize> {
    let mut map = HashMap::new();
    for record in records {
        *map.entry(record.id).or_insert(0) += 1;
    }
    map
}

#[tokio::test]
async fn emits_every_plugin_of_every_family() {
    let catalog = Arc::new(
        TestCatalog::new()
            .family(1, [100, 101, 102])
            .family(2, [200])
            .family(3, 300..350),
    );

    let records = run_to_completion(Arc::clone(&catalog), EnumeratorConfig::default()).await;

    let mut ids: Vec<i64> = records.iter().map(|r| r.id).collect();
    ids.sort_unstable();
    let mut expected: Vec<i64> = [100, 101, 102, 200].into_iter().chain(300..350).collect();
    expected.sort_unstable();
    assert_eq!(ids, expected);
    assert_eq!(catalog.list_calls.load(Ordering::SeqCst), 1);
    assert_eq!(catalog.family_calls.load(Ordering::SeqCst), 3);
    assert_eq!(catalog.plugin_calls.load(Ordering::SeqCst), expected.len());
}

#[tokio::test]
async fn duplicate_plugin_ids_are_emitted_per_occurrence() {
    let catalog = Arc::new(TestCatalog::new().family(1, [7, 8]).family(2, [7]));

    let records = run_to_completion(catalog, EnumeratorConfig::default()).await;

    let counts = counts(&records);
    assert_eq!(counts.get(&7), Some(&2));
    assert_eq!(counts.get(&8), Some(&1));
    assert_eq!(records.len(), 3);
}

#[tokio::test]
async fn zero_families_yields_empty_stream() {
    let catalog = Arc::new(TestCatalog::new());

    let records = run_to_completion(Arc::clone(&catalog), EnumeratorConfig::default()).await;

    assert!(records.is_empty());
    assert_eq!(catalog.family_calls.load(Ordering::SeqCst), 0);
    assert_eq!(catalog.plugin_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_family_contributes_nothing() {
    let catalog = Arc::new(TestCatalog::new().family(1, Vec::new()).family(2, [20, 21]));

    let records = run_to_completion(catalog, EnumeratorConfig::default()).await;

    let mut ids: Vec<i64> = records.iter().map(|r| r.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![20, 21]);
}

#[tokio::test]
async fn listing_failure_aborts_before_any_work() {
    let catalog = Arc::new(TestCatalog::new().family(1, [1, 2]).listing_fails());
    let enumerator =
        PluginEnumerator::with_catalog(Arc::clone(&catalog), EnumeratorConfig::default()).unwrap();

    let result = enumerator.enumerate().await;

    let err = result.expect_err("listing failure should surface");
    assert!(matches!(err, EnumeratorError::FamilyListing(_)));
    assert!(err.to_string().contains("401"));
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(catalog.family_calls.load(Ordering::SeqCst), 0);
    assert_eq!(catalog.plugin_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_family_is_skipped() {
    let catalog = Arc::new(
        TestCatalog::new()
            .family(1, [10, 11])
            .family(2, [20, 21])
            .failing_family(1),
    );
    let enumerator =
        PluginEnumerator::with_catalog(catalog, EnumeratorConfig::default()).unwrap();

    let mut stream = enumerator.enumerate().await.unwrap();
    let mut ids = Vec::new();
    while let Some(record) = stream.recv().await {
        ids.push(record.id);
    }
    ids.sort_unstable();
    let stats = stream.finish().await;

    assert_eq!(ids, vec![20, 21]);
    assert_eq!(stats.families_listed, 2);
    assert_eq!(stats.families_failed, 1);
    assert_eq!(stats.plugins_emitted, 2);
}

#[tokio::test]
async fn failed_plugin_is_skipped() {
    let catalog = Arc::new(
        TestCatalog::new()
            .family(1, [10, 11, 12])
            .failing_plugin(11),
    );
    let enumerator =
        PluginEnumerator::with_catalog(catalog, EnumeratorConfig::default()).unwrap();

    let mut stream = enumerator.enumerate().await.unwrap();
    let mut ids = Vec::new();
    while let Some(record) = stream.recv().await {
        ids.push(record.id);
    }
    ids.sort_unstable();
    let stats = stream.finish().await;

    assert_eq!(ids, vec![10, 12]);
    assert_eq!(stats.plugins_queued, 3);
    assert_eq!(stats.plugins_failed, 1);
    assert_eq!(stats.plugins_emitted, 2);
}

#[tokio::test]
async fn all_plugins_failing_yields_empty_stream() {
    let catalog = Arc::new(
        TestCatalog::new()
            .family(1, [1, 2])
            .failing_plugin(1)
            .failing_plugin(2),
    );

    let records = run_to_completion(catalog, EnumeratorConfig::default()).await;

    assert!(records.is_empty());
}

#[tokio::test]
async fn detail_fetches_never_exceed_worker_count() {
    let catalog = Arc::new(
        TestCatalog::new()
            .family(1, 0..40)
            .family(2, 40..80)
            .plugin_delay(Duration::from_millis(5)),
    );

    let records = run_to_completion(Arc::clone(&catalog), config(4, 20, 20, 0)).await;

    assert_eq!(records.len(), 80);
    let max = catalog.plugin_in_flight.max();
    assert!(max <= 4, "max in-flight detail fetches was {max}");
    assert!(max >= 1);
}

#[tokio::test]
async fn family_concurrency_limit_is_respected() {
    let catalog = Arc::new(
        TestCatalog::new()
            .family(1, [1])
            .family(2, [2])
            .family(3, [3])
            .family(4, [4])
            .family(5, [5])
            .family(6, [6])
            .family_delay(Duration::from_millis(10)),
    );

    let records = run_to_completion(Arc::clone(&catalog), config(10, 20, 20, 2)).await;

    assert_eq!(records.len(), 6);
    let max = catalog.family_in_flight.max();
    assert!(max <= 2, "max in-flight family fetches was {max}");
}

#[tokio::test]
async fn unit_capacities_still_complete() {
    let catalog = Arc::new(
        TestCatalog::new()
            .family(1, 0..25)
            .family(2, 25..50)
            .family(3, 50..75),
    );

    let records = run_to_completion(catalog, config(1, 1, 1, 0)).await;

    assert_eq!(records.len(), 75);
}

#[tokio::test]
async fn slow_consumer_applies_backpressure() {
    let catalog = Arc::new(TestCatalog::new().family(1, 0..100));
    let enumerator =
        PluginEnumerator::with_catalog(Arc::clone(&catalog), config(2, 4, 1, 0)).unwrap();

    let stream = enumerator.enumerate().await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    // 출력 버퍼 1개 + 워커마다 전송 대기 중인 레코드 1개
    let fetched = catalog.plugin_calls.load(Ordering::SeqCst);
    assert!(fetched <= 3, "fetched {fetched} records without a consumer");

    let records = tokio::time::timeout(TEST_TIMEOUT, stream.collect_all())
        .await
        .expect("enumeration should terminate");
    assert_eq!(records.len(), 100);
}

#[tokio::test]
async fn dropping_stream_stops_remaining_work() {
    let catalog = Arc::new(
        TestCatalog::new()
            .family(1, 0..200)
            .plugin_delay(Duration::from_millis(2)),
    );
    let enumerator =
        PluginEnumerator::with_catalog(Arc::clone(&catalog), config(2, 2, 1, 0)).unwrap();

    let mut stream = enumerator.enumerate().await.unwrap();
    assert!(stream.recv().await.is_some());
    drop(stream);

    tokio::time::sleep(Duration::from_millis(50)).await;
    let after_drop = catalog.plugin_calls.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(catalog.plugin_calls.load(Ordering::SeqCst), after_drop);
    assert!(after_drop < 200);
}

#[tokio::test]
async fn finish_after_partial_consumption_terminates() {
    let catalog = Arc::new(
        TestCatalog::new()
            .family(1, 0..100)
            .family(2, 100..200)
            .plugin_delay(Duration::from_millis(1)),
    );
    let enumerator =
        PluginEnumerator::with_catalog(Arc::clone(&catalog), config(3, 2, 1, 0)).unwrap();

    let mut stream = enumerator.enumerate().await.unwrap();
    for _ in 0..5 {
        assert!(stream.recv().await.is_some());
    }

    let stats = tokio::time::timeout(TEST_TIMEOUT, stream.finish())
        .await
        .expect("finish should not hang after cancellation");
    assert!(stats.plugins_emitted >= 5);
    assert!(stats.plugins_emitted < 200);
}

#[tokio::test]
async fn explicit_cancel_ends_stream() {
    let catalog = Arc::new(
        TestCatalog::new()
            .family(1, 0..500)
            .plugin_delay(Duration::from_millis(1)),
    );
    let enumerator = PluginEnumerator::with_catalog(catalog, config(2, 2, 1, 0)).unwrap();

    let mut stream = enumerator.enumerate().await.unwrap();
    assert!(stream.recv().await.is_some());
    stream.cancel();
    assert!(stream.is_cancelled());

    let drained = tokio::time::timeout(TEST_TIMEOUT, async {
        let mut n = 0usize;
        while stream.recv().await.is_some() {
            n += 1;
        }
        n
    })
    .await
    .expect("cancelled stream should end");
    assert!(drained < 499);
}

#[tokio::test]
async fn stream_trait_consumption() {
    use tokio_stream::StreamExt;

    let catalog = Arc::new(TestCatalog::new().family(1, [1, 2, 3]).family(2, [4]));
    let enumerator =
        PluginEnumerator::with_catalog(catalog, EnumeratorConfig::default()).unwrap();

    let stream = enumerator.enumerate().await.unwrap();
    let mut ids: Vec<i64> = tokio::time::timeout(TEST_TIMEOUT, stream.map(|r| r.id).collect())
        .await
        .expect("stream should end");
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn enumerator_is_reusable_across_runs() {
    let catalog = Arc::new(TestCatalog::new().family(1, [1, 2]));
    let enumerator =
        PluginEnumerator::with_catalog(Arc::clone(&catalog), EnumeratorConfig::default()).unwrap();

    for _ in 0..3 {
        let stream = enumerator.enumerate().await.unwrap();
        let records = tokio::time::timeout(TEST_TIMEOUT, stream.collect_all())
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
    }
    assert_eq!(catalog.list_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn emitted_records_carry_details() {
    let catalog = Arc::new(TestCatalog::new().family(1, [42]));

    let records = run_to_completion(catalog, EnumeratorConfig::default()).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "plugin-42");
    assert_eq!(records[0].attribute("risk_factor"), Some("High"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn slow_families_are_drained_before_close_on_multi_thread_runtime() {
    const ROUNDS: usize = 30;
    const FAMILIES: i64 = 50;
    const PLUGINS_PER_FAMILY: i64 = 40;
    const FAILING_FAMILY: i64 = 13;
    let workers = 3;

    let plugin_ids = |family: i64| (family * 100)..(family * 100 + PLUGINS_PER_FAMILY);
    let plugin_fails = |id: i64| id % 97 == 5;

    let mut expected: Vec<i64> = (1..=FAMILIES)
        .filter(|&family| family != FAILING_FAMILY)
        .flat_map(plugin_ids)
        .filter(|&id| !plugin_fails(id))
        .collect();
    expected.sort_unstable();

    for round in 0..ROUNDS {
        let mut catalog = TestCatalog::new().failing_family(FAILING_FAMILY);
        for family in 1..=FAMILIES {
            catalog = catalog.family(family, plugin_ids(family));
            if family % 7 == 0 {
                let delay = Duration::from_millis(30 + family as u64);
                catalog = catalog.slow_family(family, delay);
            }
            for id in plugin_ids(family).filter(|&id| plugin_fails(id)) {
                catalog = catalog.failing_plugin(id);
            }
        }
        let catalog = Arc::new(catalog);

        let enumerator =
            PluginEnumerator::with_catalog(Arc::clone(&catalog), config(workers, 2, 1, 0))
                .unwrap();
        let mut stream = enumerator.enumerate().await.unwrap();
        let mut ids = Vec::with_capacity(expected.len());
        let drained = tokio::time::timeout(TEST_TIMEOUT, async {
            while let Some(record) = stream.recv().await {
                ids.push(record.id);
            }
        })
        .await;
        assert!(drained.is_ok(), "round {round}: enumeration should terminate");
        let stats = stream.finish().await;

        ids.sort_unstable();
        assert_eq!(ids.len(), expected.len(), "round {round}: emitted count");
        assert_eq!(ids, expected, "round {round}: emitted plugins");
        assert!(
            catalog.plugin_in_flight.max() <= workers,
            "round {round}: {} concurrent detail fetches",
            catalog.plugin_in_flight.max()
        );
        assert_eq!(stats.families_failed, 1);
        assert_eq!(stats.plugins_emitted, expected.len() as u64);
    }
}
