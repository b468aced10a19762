//! Ironscan 열거 파이프라인
//!
//! 원격 플러그인 카탈로그의 모든 plugin 상세 레코드를 제한된 동시성으로 가져와
//! 하나의 지연 스트림으로 내보냅니다.
//!
//! # 처리 단계
//!
//! 1. family 목록 조회 (1회, 실패 시 전체 중단)
//! 2. family마다 태스크를 스폰해 plugin ID를 큐에 추가
//! 3. 고정 크기 워커 풀이 plugin 상세를 조회해 출력 스트림에 전달
//! 4. 모든 family와 plugin 조회가 끝나면 스트림 종료
//!
//! 개별 family 또는 plugin 조회 실패는 로그만 남기고 건너뜁니다.
//!
//! # 사용 예시
//! ```ignore
//! use ironscan_enumerator::{EnumeratorConfigBuilder, PluginEnumerator};
//!
//! let config = EnumeratorConfigBuilder::new().workers(16).build()?;
//! let enumerator = PluginEnumerator::new(catalog, config)?;
//!
//! let mut stream = enumerator.enumerate().await?;
//! while let Some(record) = stream.recv().await {
//!     println!("{} {}", record.id, record.name);
//! }
//! let stats = stream.finish().await;
//! ```

pub mod barrier;
pub mod config;
pub mod enumerator;
pub mod error;
pub mod stream;

pub use barrier::{PendingGuard, WaitGroup};
pub use config::{EnumeratorConfig, EnumeratorConfigBuilder};
pub use enumerator::PluginEnumerator;
pub use error::EnumeratorError;
pub use stream::{EnumerationStats, PluginStream, StatsSnapshot};
