//! 진행 중 작업 카운터 (join barrier)
//!
//! [`WaitGroup`]은 스케줄된 작업 단위 수를 세고, 0이 되면 [`WaitGroup::wait`]를 깨웁니다.
//! 작업 단위는 [`WaitGroup::add`]가 돌려준 [`PendingGuard`]를 소유하며,
//! guard가 drop될 때 카운터가 정확히 한 번 감소합니다 (성공, 실패, 취소 무관).
//!
//! 카운터 증가는 작업이 다른 태스크에 보이기 전에 일어나야 합니다.
//! 그렇지 않으면 관찰자가 아직 스케줄 중인 작업이 있는데도 0을 볼 수 있습니다.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    pending: AtomicUsize,
    zero: Notify,
}

/// 진행 중 작업 수를 추적하는 join barrier
#[derive(Debug, Clone, Default)]
pub struct WaitGroup {
    inner: Arc<Inner>,
}

impl WaitGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// 작업 하나를 등록하고 완료 시 drop할 guard를 반환합니다.
    #[must_use = "dropping the guard immediately marks the work as finished"]
    pub fn add(&self) -> PendingGuard {
        self.inner.pending.fetch_add(1, Ordering::AcqRel);
        PendingGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    /// 현재 진행 중인 작업 수
    pub fn pending(&self) -> usize {
        self.inner.pending.load(Ordering::Acquire)
    }

    /// 진행 중인 작업이 0이 될 때까지 기다립니다.
    ///
    /// 이미 0이면 즉시 반환합니다.
    pub async fn wait(&self) {
        loop {
            let notified = self.inner.zero.notified();
            tokio::pin!(notified);
            // 카운터 확인 전에 waiter로 등록해야 notify_waiters를 놓치지 않음
            notified.as_mut().enable();

            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// 등록된 작업 하나를 나타내는 guard
///
/// drop 시 카운터를 감소시키고, 마지막 guard였다면 대기자를 깨웁니다.
#[derive(Debug)]
pub struct PendingGuard {
    inner: Arc<Inner>,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        if self.inner.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.inner.zero.notify_waiters();
        }
    }
}
