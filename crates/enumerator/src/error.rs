//! 열거 파이프라인 에러 타입
//!
//! [`EnumeratorError`]는 호출자에게 전달될 수 있는 에러만 담습니다.
//! 개별 family/plugin 조회 실패는 파이프라인 내부에서 버려지므로 여기에 없습니다.
//!
//! # 에러 카테고리
//!
//! - **설정**: `Config`
//! - **초기 family 목록 조회 실패**: `FamilyListing` (열거 전체 중단)

use ironscan_core::error::{CatalogError, ConfigError, IronscanError, PipelineError};

/// 열거 파이프라인 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum EnumeratorError {
    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 초기 family 목록 조회 실패
    ///
    /// 어떤 태스크도 스케줄되기 전에 반환됩니다.
    #[error("family listing failed: {0}")]
    FamilyListing(#[source] CatalogError),
}

impl From<EnumeratorError> for IronscanError {
    fn from(err: EnumeratorError) -> Self {
        match err {
            EnumeratorError::Config { field, reason } => {
                IronscanError::Config(ConfigError::InvalidValue { field, reason })
            }
            EnumeratorError::FamilyListing(source) => {
                IronscanError::Pipeline(PipelineError::FamilyListing(source.to_string()))
            }
        }
    }
}
