//! 열거 오케스트레이션 -- family 목록에서 plugin 레코드 스트림까지의 전체 흐름
//!
//! # 내부 아키텍처
//! ```text
//! list_families ─┬─> family task ─┐                      ┌─> worker ─┐
//!                ├─> family task ─┼─> mpsc(PluginRef) ───┼─> worker ─┼─> mpsc(PluginRecord) -> PluginStream
//!                └─> family task ─┘    (id queue)        └─> worker ─┘      (output)
//!                                         ▲
//!                          coordinator: families 0 → id queue 닫기
//!                                       plugins 0  → output 닫기
//! ```
//!
//! 큐에 들어가는 모든 plugin ID는 [`PendingGuard`]를 함께 운반합니다.
//! guard는 전송 전에 획득되고 워커가 조회와 전달을 마친 뒤 drop되므로,
//! 코디네이터가 0을 관찰하는 시점에는 스케줄 중이거나 진행 중인 조회가 없습니다.

use std::sync::Arc;
use std::time::Instant;

use metrics::histogram;
use tokio::sync::{Mutex, Semaphore, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use ironscan_core::catalog::PluginCatalog;
use ironscan_core::metrics as names;
use ironscan_core::types::{FamilyRef, PluginRecord, PluginRef};

use crate::barrier::{PendingGuard, WaitGroup};
use crate::config::EnumeratorConfig;
use crate::error::EnumeratorError;
use crate::stream::{EnumerationStats, PluginStream};

/// plugin ID 큐 항목
struct QueuedPlugin {
    plugin: PluginRef,
    pending: PendingGuard,
}

/// 워커들이 공유하는 plugin ID 큐 수신측
type SharedQueue = Arc<Mutex<mpsc::Receiver<QueuedPlugin>>>;

/// 플러그인 카탈로그 대량 열거기
///
/// 설정된 카탈로그에 대해 [`enumerate`](Self::enumerate)를 호출할 때마다
/// 독립된 열거 실행을 시작합니다. 한 번 생성한 열거기는 여러 번 사용할 수 있습니다.
///
/// # 사용 예시
/// ```ignore
/// use ironscan_enumerator::{EnumeratorConfig, PluginEnumerator};
///
/// let enumerator = PluginEnumerator::new(client, EnumeratorConfig::default())?;
/// let mut stream = enumerator.enumerate().await?;
/// while let Some(record) = stream.recv().await {
///     println!("{record}");
/// }
/// ```
pub struct PluginEnumerator<C: PluginCatalog> {
    catalog: Arc<C>,
    config: EnumeratorConfig,
}

impl<C: PluginCatalog> PluginEnumerator<C> {
    /// 카탈로그를 소유하는 열거기를 생성합니다.
    ///
    /// # Errors
    ///
    /// 설정 검증 실패 시 `EnumeratorError::Config` 반환
    pub fn new(catalog: C, config: EnumeratorConfig) -> Result<Self, EnumeratorError> {
        Self::with_catalog(Arc::new(catalog), config)
    }

    /// 이미 공유 중인 카탈로그로 열거기를 생성합니다.
    pub fn with_catalog(catalog: Arc<C>, config: EnumeratorConfig) -> Result<Self, EnumeratorError> {
        config.validate()?;
        Ok(Self { catalog, config })
    }

    pub fn config(&self) -> &EnumeratorConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Arc<C> {
        &self.catalog
    }

    /// 카탈로그 전체를 열거하는 스트림을 시작합니다.
    ///
    /// family 목록 조회는 호출 안에서 끝나며, 실패하면 아무 태스크도 스폰하지 않고
    /// `EnumeratorError::FamilyListing`을 반환합니다. 이후의 개별 family/plugin 조회
    /// 실패는 로그로 남기고 건너뜁니다.
    ///
    /// tokio 런타임 안에서 호출해야 합니다.
    pub async fn enumerate(&self) -> Result<PluginStream, EnumeratorError> {
        let run_id = Uuid::new_v4().to_string();
        let started = Instant::now();

        let families = self.catalog.list_families().await.map_err(|e| {
            warn!(run_id = %run_id, error = %e, "failed to list plugin families");
            EnumeratorError::FamilyListing(e)
        })?;

        let stats = Arc::new(EnumerationStats::default());
        stats.record_families_listed(families.len());

        info!(
            run_id = %run_id,
            families = families.len(),
            workers = self.config.workers,
            family_concurrency = self.config.family_concurrency,
            "starting plugin enumeration"
        );

        let (id_tx, id_rx) = mpsc::channel::<QueuedPlugin>(self.config.id_queue_capacity);
        let (out_tx, out_rx) = mpsc::channel::<PluginRecord>(self.config.output_capacity);
        let cancel = CancellationToken::new();
        let family_group = WaitGroup::new();
        let plugin_group = WaitGroup::new();
        let limiter = (self.config.family_concurrency > 0)
            .then(|| Arc::new(Semaphore::new(self.config.family_concurrency)));

        // 1. family 태스크 스폰 (guard는 스폰 전에 획득)
        let mut family_tasks = Vec::with_capacity(families.len());
        for family in families {
            let task = FamilyTask {
                catalog: Arc::clone(&self.catalog),
                family,
                ids: id_tx.clone(),
                plugins: plugin_group.clone(),
                limiter: limiter.clone(),
                cancel: cancel.clone(),
                stats: Arc::clone(&stats),
                run_id: run_id.clone(),
                done: family_group.add(),
            };
            family_tasks.push(tokio::spawn(fan_out_family(task)));
        }

        // 2. 워커 풀
        let queue: SharedQueue = Arc::new(Mutex::new(id_rx));
        let workers = (0..self.config.workers)
            .map(|index| {
                tokio::spawn(run_worker(Worker {
                    index,
                    catalog: Arc::clone(&self.catalog),
                    queue: Arc::clone(&queue),
                    output: out_tx.clone(),
                    cancel: cancel.clone(),
                    stats: Arc::clone(&stats),
                    run_id: run_id.clone(),
                }))
            })
            .collect();

        // 3. 종료 코디네이터
        let coordinator = tokio::spawn(coordinate(Coordinator {
            families: family_group,
            plugins: plugin_group,
            ids: id_tx,
            output: out_tx,
            workers,
            family_tasks,
            cancel: cancel.clone(),
            stats: Arc::clone(&stats),
            run_id: run_id.clone(),
            started,
        }));

        Ok(PluginStream::new(out_rx, cancel, stats, run_id, coordinator))
    }
}

struct FamilyTask<C> {
    catalog: Arc<C>,
    family: FamilyRef,
    ids: mpsc::Sender<QueuedPlugin>,
    plugins: WaitGroup,
    limiter: Option<Arc<Semaphore>>,
    cancel: CancellationToken,
    stats: Arc<EnumerationStats>,
    run_id: String,
    done: PendingGuard,
}

/// family 하나의 plugin ID를 큐에 넣습니다.
async fn fan_out_family<C: PluginCatalog>(task: FamilyTask<C>) {
    let FamilyTask {
        catalog,
        family,
        ids,
        plugins,
        limiter,
        cancel,
        stats,
        run_id,
        done,
    } = task;

    let permit = match limiter {
        Some(semaphore) => tokio::select! {
            biased;
            () = cancel.cancelled() => return,
            permit = semaphore.acquire_owned() => permit.ok(),
        },
        None => None,
    };

    let result = tokio::select! {
        biased;
        () = cancel.cancelled() => return,
        result = catalog.family_plugins(family.id) => result,
    };
    drop(permit);

    let refs = match result {
        Ok(refs) => refs,
        Err(e) => {
            stats.record_family_failed();
            warn!(
                run_id = %run_id,
                family_id = family.id,
                family = %family.name,
                error = %e,
                "failed to fetch family details, skipping family"
            );
            return;
        }
    };

    debug!(
        run_id = %run_id,
        family_id = family.id,
        plugins = refs.len(),
        "queueing family plugins"
    );

    for plugin in refs {
        let item = QueuedPlugin {
            plugin,
            pending: plugins.add(),
        };
        let sent = tokio::select! {
            biased;
            () = cancel.cancelled() => return,
            sent = ids.send(item) => sent,
        };
        if sent.is_err() {
            return;
        }
        stats.record_plugin_queued();
    }

    drop(ids);
    drop(done);
}

struct Worker<C> {
    index: usize,
    catalog: Arc<C>,
    queue: SharedQueue,
    output: mpsc::Sender<PluginRecord>,
    cancel: CancellationToken,
    stats: Arc<EnumerationStats>,
    run_id: String,
}

/// 큐가 닫힐 때까지 plugin 상세를 조회해 출력으로 보냅니다.
async fn run_worker<C: PluginCatalog>(worker: Worker<C>) {
    let Worker {
        index,
        catalog,
        queue,
        output,
        cancel,
        stats,
        run_id,
    } = worker;

    loop {
        let next = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            next = async { queue.lock().await.recv().await } => next,
        };
        let Some(QueuedPlugin { plugin, pending }) = next else {
            break;
        };

        let fetched = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            fetched = catalog.plugin_details(plugin.id) => fetched,
        };

        match fetched {
            Ok(record) => {
                let sent = tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    sent = output.send(record) => sent,
                };
                if sent.is_err() {
                    debug!(run_id = %run_id, worker = index, "output stream dropped, cancelling enumeration");
                    cancel.cancel();
                    break;
                }
                stats.record_plugin_emitted();
            }
            Err(e) => {
                stats.record_plugin_failed();
                debug!(
                    run_id = %run_id,
                    worker = index,
                    plugin_id = plugin.id,
                    family_id = plugin.family_id,
                    error = %e,
                    "failed to fetch plugin details, skipping plugin"
                );
            }
        }

        drop(pending);
    }
}

struct Coordinator {
    families: WaitGroup,
    plugins: WaitGroup,
    ids: mpsc::Sender<QueuedPlugin>,
    output: mpsc::Sender<PluginRecord>,
    workers: Vec<JoinHandle<()>>,
    family_tasks: Vec<JoinHandle<()>>,
    cancel: CancellationToken,
    stats: Arc<EnumerationStats>,
    run_id: String,
    started: Instant,
}

/// 두 단계 종료 프로토콜: family 완료 후 큐를 닫고, plugin 완료 후 출력을 닫습니다.
async fn coordinate(coordinator: Coordinator) {
    let Coordinator {
        families,
        plugins,
        ids,
        output,
        workers,
        family_tasks,
        cancel,
        stats,
        run_id,
        started,
    } = coordinator;

    tokio::select! {
        () = cancel.cancelled() => {}
        () = families.wait() => {
            debug!(run_id = %run_id, "all families processed, closing id queue");
        }
    }
    drop(ids);

    let completed = tokio::select! {
        () = cancel.cancelled() => false,
        () = plugins.wait() => true,
    };
    drop(output);

    for handle in workers.into_iter().chain(family_tasks) {
        if let Err(e) = handle.await {
            warn!(run_id = %run_id, error = %e, "enumeration task failed");
        }
    }

    let elapsed = started.elapsed();
    histogram!(names::ENUMERATOR_RUN_DURATION_SECONDS).record(elapsed.as_secs_f64());

    let snapshot = stats.snapshot();
    if completed {
        info!(
            run_id = %run_id,
            families = snapshot.families_listed,
            families_failed = snapshot.families_failed,
            plugins = snapshot.plugins_emitted,
            plugins_failed = snapshot.plugins_failed,
            elapsed_ms = elapsed.as_millis() as u64,
            "plugin enumeration completed"
        );
    } else {
        info!(
            run_id = %run_id,
            plugins = snapshot.plugins_emitted,
            elapsed_ms = elapsed.as_millis() as u64,
            "plugin enumeration cancelled"
        );
    }
}
