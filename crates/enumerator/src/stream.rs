//! 출력 스트림 - 완료된 plugin 레코드의 지연 시퀀스
//!
//! [`PluginStream`]은 한 번만 소비할 수 있는 전진 전용 시퀀스입니다.
//! 버퍼가 가득 차면 워커가 전송 지점에서 대기하므로 메모리 사용이 제한됩니다.
//!
//! 스트림은 열거 코디네이터가 모든 plugin 조회 완료를 확인한 뒤에만 끝납니다 (`None`).
//! 스트림을 drop하거나 [`PluginStream::cancel`]을 호출하면 백그라운드 태스크가
//! 모든 대기 지점에서 취소를 감지하고 종료합니다.

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};

use metrics::counter;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::Stream;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use ironscan_core::metrics as names;
use ironscan_core::types::PluginRecord;

/// 열거 1회의 진행 카운터
///
/// 모든 태스크가 공유하며, 갱신과 동시에 메트릭 카운터도 올립니다.
#[derive(Debug, Default)]
pub struct EnumerationStats {
    families_listed: AtomicU64,
    families_failed: AtomicU64,
    plugins_queued: AtomicU64,
    plugins_emitted: AtomicU64,
    plugins_failed: AtomicU64,
}

impl EnumerationStats {
    pub(crate) fn record_families_listed(&self, count: usize) {
        let count = u64::try_from(count).unwrap_or(u64::MAX);
        self.families_listed.fetch_add(count, Ordering::Relaxed);
        counter!(names::ENUMERATOR_FAMILIES_LISTED_TOTAL).increment(count);
    }

    pub(crate) fn record_family_failed(&self) {
        self.families_failed.fetch_add(1, Ordering::Relaxed);
        counter!(names::ENUMERATOR_FAMILIES_FAILED_TOTAL).increment(1);
    }

    pub(crate) fn record_plugin_queued(&self) {
        self.plugins_queued.fetch_add(1, Ordering::Relaxed);
        counter!(names::ENUMERATOR_PLUGINS_QUEUED_TOTAL).increment(1);
    }

    pub(crate) fn record_plugin_emitted(&self) {
        self.plugins_emitted.fetch_add(1, Ordering::Relaxed);
        counter!(names::ENUMERATOR_PLUGINS_EMITTED_TOTAL).increment(1);
    }

    pub(crate) fn record_plugin_failed(&self) {
        self.plugins_failed.fetch_add(1, Ordering::Relaxed);
        counter!(names::ENUMERATOR_PLUGINS_FAILED_TOTAL).increment(1);
    }

    /// 현재 값의 스냅샷을 반환합니다.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            families_listed: self.families_listed.load(Ordering::Relaxed),
            families_failed: self.families_failed.load(Ordering::Relaxed),
            plugins_queued: self.plugins_queued.load(Ordering::Relaxed),
            plugins_emitted: self.plugins_emitted.load(Ordering::Relaxed),
            plugins_failed: self.plugins_failed.load(Ordering::Relaxed),
        }
    }
}

/// [`EnumerationStats`]의 시점 스냅샷
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// 초기 목록에서 받은 family 수
    pub families_listed: u64,
    /// 상세 조회에 실패해 버려진 family 수
    pub families_failed: u64,
    /// 큐에 들어간 plugin ID 수
    pub plugins_queued: u64,
    /// 출력 스트림으로 전달된 레코드 수
    pub plugins_emitted: u64,
    /// 상세 조회에 실패해 버려진 plugin 수
    pub plugins_failed: u64,
}

/// plugin 레코드 출력 스트림
///
/// `recv()`로 직접 소비하거나 [`Stream`]으로 사용할 수 있습니다.
/// 방출 순서는 조회 완료 순서이며 보장되지 않습니다.
pub struct PluginStream {
    rx: mpsc::Receiver<PluginRecord>,
    cancel: CancellationToken,
    stats: Arc<EnumerationStats>,
    run_id: String,
    coordinator: Option<JoinHandle<()>>,
}

impl PluginStream {
    pub(crate) fn new(
        rx: mpsc::Receiver<PluginRecord>,
        cancel: CancellationToken,
        stats: Arc<EnumerationStats>,
        run_id: String,
        coordinator: JoinHandle<()>,
    ) -> Self {
        Self {
            rx,
            cancel,
            stats,
            run_id,
            coordinator: Some(coordinator),
        }
    }

    /// 다음 레코드를 받습니다. 열거가 끝나면 `None`.
    pub async fn recv(&mut self) -> Option<PluginRecord> {
        self.rx.recv().await
    }

    /// 열거 실행 ID (로그의 `run_id` 필드와 동일)
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// 현재까지의 진행 카운터
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// 백그라운드 태스크에 취소 신호를 보냅니다.
    ///
    /// 이미 버퍼에 있는 레코드는 계속 받을 수 있지만, 새 레코드는 더 이상 들어오지 않습니다.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// 취소 여부
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// 남은 레코드를 모두 받아 반환합니다.
    pub async fn collect_all(mut self) -> Vec<PluginRecord> {
        let mut records = Vec::new();
        while let Some(record) = self.rx.recv().await {
            records.push(record);
        }
        records
    }

    /// 스트림을 닫고 백그라운드 태스크가 모두 끝날 때까지 기다립니다.
    ///
    /// 끝까지 소비하지 않은 상태라면 남은 작업은 취소됩니다.
    pub async fn finish(mut self) -> StatsSnapshot {
        self.rx.close();
        self.cancel.cancel();
        if let Some(handle) = self.coordinator.take()
            && let Err(e) = handle.await
        {
            warn!(run_id = %self.run_id, error = %e, "enumeration coordinator task failed");
        }
        self.stats.snapshot()
    }
}

impl Stream for PluginStream {
    type Item = PluginRecord;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

impl Drop for PluginStream {
    fn drop(&mut self) {
        // 호출자가 중간에 소비를 멈추면 백그라운드 태스크도 정리
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for PluginStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginStream")
            .field("run_id", &self.run_id)
            .field("cancelled", &self.cancel.is_cancelled())
            .field("stats", &self.stats.snapshot())
            .finish()
    }
}
