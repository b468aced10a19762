//! 열거 파이프라인 설정
//!
//! [`EnumeratorConfig`]는 core의 [`EnumerationConfig`](ironscan_core::config::EnumerationConfig)에서
//! 파생됩니다.
//!
//! # 사용 예시
//!
//! ```
//! use ironscan_enumerator::{EnumeratorConfig, EnumeratorConfigBuilder};
//!
//! let config = EnumeratorConfig::default();
//! config.validate().unwrap();
//!
//! let config = EnumeratorConfigBuilder::new()
//!     .workers(32)
//!     .family_concurrency(8)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.workers, 32);
//! ```

use serde::{Deserialize, Serialize};

use ironscan_core::config::{EnumerationConfig, MAX_CHANNEL_CAPACITY, MAX_WORKERS};

use crate::error::EnumeratorError;

/// 열거 파이프라인 설정
///
/// # 필드
///
/// - **workers**: plugin 상세 조회 워커 수 (동시 상세 조회 상한)
/// - **id_queue_capacity**: family 태스크와 워커 사이 plugin ID 큐 용량
/// - **output_capacity**: 출력 스트림 버퍼 용량 (백프레셔)
/// - **family_concurrency**: 동시 family 상세 조회 상한 (0이면 상한 없음)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumeratorConfig {
    pub workers: usize,
    pub id_queue_capacity: usize,
    pub output_capacity: usize,
    pub family_concurrency: usize,
}

impl Default for EnumeratorConfig {
    fn default() -> Self {
        Self::from_core(&EnumerationConfig::default())
    }
}

impl EnumeratorConfig {
    /// core의 `EnumerationConfig`에서 설정을 생성합니다.
    pub fn from_core(core: &EnumerationConfig) -> Self {
        Self {
            workers: core.workers,
            id_queue_capacity: core.id_queue_capacity,
            output_capacity: core.output_capacity,
            family_concurrency: core.family_concurrency,
        }
    }

    /// 설정 값의 유효성을 검증합니다.
    ///
    /// # 검증 규칙
    ///
    /// - `workers`: 1-256
    /// - `id_queue_capacity`, `output_capacity`: 1-65536
    /// - `family_concurrency`: 제한 없음 (0은 상한 없음)
    pub fn validate(&self) -> Result<(), EnumeratorError> {
        if self.workers == 0 || self.workers > MAX_WORKERS {
            return Err(EnumeratorError::Config {
                field: "workers".to_owned(),
                reason: format!("must be 1-{MAX_WORKERS}"),
            });
        }

        if self.id_queue_capacity == 0 || self.id_queue_capacity > MAX_CHANNEL_CAPACITY {
            return Err(EnumeratorError::Config {
                field: "id_queue_capacity".to_owned(),
                reason: format!("must be 1-{MAX_CHANNEL_CAPACITY}"),
            });
        }

        if self.output_capacity == 0 || self.output_capacity > MAX_CHANNEL_CAPACITY {
            return Err(EnumeratorError::Config {
                field: "output_capacity".to_owned(),
                reason: format!("must be 1-{MAX_CHANNEL_CAPACITY}"),
            });
        }

        Ok(())
    }
}

/// [`EnumeratorConfig`] 빌더
#[derive(Default)]
pub struct EnumeratorConfigBuilder {
    config: EnumeratorConfig,
}

impl EnumeratorConfigBuilder {
    /// 기본값을 가진 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    pub fn id_queue_capacity(mut self, capacity: usize) -> Self {
        self.config.id_queue_capacity = capacity;
        self
    }

    pub fn output_capacity(mut self, capacity: usize) -> Self {
        self.config.output_capacity = capacity;
        self
    }

    /// 동시 family 조회 상한을 설정합니다. 0이면 상한 없음.
    pub fn family_concurrency(mut self, limit: usize) -> Self {
        self.config.family_concurrency = limit;
        self
    }

    /// 설정을 검증하고 빌드합니다.
    ///
    /// # Errors
    ///
    /// 유효성 검증 실패 시 `EnumeratorError::Config` 반환
    pub fn build(self) -> Result<EnumeratorConfig, EnumeratorError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = EnumeratorConfig::default();
        config.validate().unwrap();
        assert_eq!(config.workers, 10);
        assert_eq!(config.output_capacity, 20);
    }

    #[test]
    fn from_core_preserves_values() {
        let core = EnumerationConfig {
            workers: 4,
            id_queue_capacity: 100,
            output_capacity: 50,
            family_concurrency: 2,
        };
        let config = EnumeratorConfig::from_core(&core);
        assert_eq!(config.workers, 4);
        assert_eq!(config.id_queue_capacity, 100);
        assert_eq!(config.output_capacity, 50);
        assert_eq!(config.family_concurrency, 2);
    }

    #[test]
    fn validate_rejects_zero_workers() {
        let config = EnumeratorConfig {
            workers: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_too_many_workers() {
        let config = EnumeratorConfig {
            workers: MAX_WORKERS + 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_queue_capacity() {
        let config = EnumeratorConfig {
            id_queue_capacity: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("id_queue_capacity"));
    }

    #[test]
    fn validate_rejects_zero_output_capacity() {
        let config = EnumeratorConfig {
            output_capacity: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("output_capacity"));
    }

    #[test]
    fn builder_all_setters() {
        let config = EnumeratorConfigBuilder::new()
            .workers(3)
            .id_queue_capacity(7)
            .output_capacity(1)
            .family_concurrency(5)
            .build()
            .unwrap();
        assert_eq!(
            config,
            EnumeratorConfig {
                workers: 3,
                id_queue_capacity: 7,
                output_capacity: 1,
                family_concurrency: 5,
            }
        );
    }

    #[test]
    fn builder_rejects_invalid_config() {
        assert!(EnumeratorConfigBuilder::new().workers(0).build().is_err());
    }
}
