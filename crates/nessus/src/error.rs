//! Nessus 클라이언트 에러 타입
//!
//! [`NessusError`]는 Nessus REST API 호출 중 발생하는 모든 에러를 표현합니다.
//! `From` 구현으로 카탈로그 에러와 최상위 `IronscanError`로 변환됩니다.

use ironscan_core::error::{CatalogError, ConfigError, IronscanError};

/// Nessus 클라이언트 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum NessusError {
    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// API URL 파싱 실패
    #[error("invalid api url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// TLS 설정 실패 (CA 인증서 로드 등)
    #[error("tls setup failed: {0}")]
    Tls(String),

    /// 네트워크 전송 실패
    #[error("transport failed: {0}")]
    Transport(String),

    /// 기대하지 않은 HTTP 상태 코드
    #[error("unexpected status code, got {status} wanted {expected:?} ({body})")]
    UnexpectedStatus {
        /// 응답 상태 코드
        status: u16,
        /// 허용된 상태 코드 목록
        expected: Vec<u16>,
        /// 응답 본문
        body: String,
    },

    /// 응답 본문 디코딩 실패
    #[error("failed to decode response from {resource}: {reason}")]
    Decode { resource: String, reason: String },

    /// 요청 본문 직렬화 실패
    #[error("failed to encode request body: {0}")]
    Encode(String),
}

impl From<NessusError> for CatalogError {
    fn from(err: NessusError) -> Self {
        match err {
            NessusError::UnexpectedStatus { status, body, .. } => {
                CatalogError::Status { status, body }
            }
            NessusError::Decode { .. } => CatalogError::Decode(err.to_string()),
            other => CatalogError::Transport(other.to_string()),
        }
    }
}

impl From<NessusError> for IronscanError {
    fn from(err: NessusError) -> Self {
        match err {
            NessusError::Config { field, reason } => {
                IronscanError::Config(ConfigError::InvalidValue { field, reason })
            }
            NessusError::InvalidUrl { url, reason } => {
                IronscanError::Config(ConfigError::InvalidValue {
                    field: "nessus.api_url".to_owned(),
                    reason: format!("{url}: {reason}"),
                })
            }
            other => IronscanError::Catalog(other.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexpected_status_display_lists_expected_codes() {
        let err = NessusError::UnexpectedStatus {
            status: 403,
            expected: vec![200],
            body: r#"{"error":"forbidden"}"#.to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("got 403"));
        assert!(msg.contains("[200]"));
        assert!(msg.contains("forbidden"));
    }

    #[test]
    fn unexpected_status_maps_to_catalog_status() {
        let err = NessusError::UnexpectedStatus {
            status: 404,
            expected: vec![200],
            body: "not found".to_owned(),
        };
        let catalog: CatalogError = err.into();
        assert!(matches!(catalog, CatalogError::Status { status: 404, .. }));
    }

    #[test]
    fn decode_maps_to_catalog_decode() {
        let err = NessusError::Decode {
            resource: "/plugins/families".to_owned(),
            reason: "expected value".to_owned(),
        };
        let catalog: CatalogError = err.into();
        match catalog {
            CatalogError::Decode(msg) => assert!(msg.contains("/plugins/families")),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn transport_maps_to_catalog_transport() {
        let catalog: CatalogError = NessusError::Transport("connection refused".to_owned()).into();
        assert!(matches!(catalog, CatalogError::Transport(_)));
    }

    #[test]
    fn invalid_url_maps_to_config_error() {
        let err = NessusError::InvalidUrl {
            url: "::".to_owned(),
            reason: "relative URL without a base".to_owned(),
        };
        let top: IronscanError = err.into();
        assert!(matches!(
            top,
            IronscanError::Config(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn transport_maps_to_ironscan_catalog_error() {
        let top: IronscanError = NessusError::Tls("bad pem".to_owned()).into();
        assert!(matches!(top, IronscanError::Catalog(CatalogError::Transport(_))));
    }
}
