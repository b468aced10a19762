//! 에러 타입 - 도메인별 에러 정의

/// Ironscan 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum IronscanError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 원격 카탈로그 호출 에러
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// 파이프라인 처리 에러
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 원격 카탈로그(게이트웨이) 호출 에러
///
/// 전송 실패, 예상치 못한 HTTP 상태, 응답 디코딩 실패를 구분합니다.
/// 열거 파이프라인은 개별 family/plugin 조회에서 발생한 이 에러를
/// 해당 항목만 버리고 계속 진행합니다.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// 네트워크/전송 계층 실패
    #[error("transport failed: {0}")]
    Transport(String),

    /// 예상하지 않은 응답 상태
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// 응답 본문 디코딩 실패
    #[error("decode failed: {0}")]
    Decode(String),
}

/// 파이프라인 처리 에러
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// 파이프라인 초기화 실패
    #[error("pipeline init failed: {0}")]
    InitFailed(String),

    /// 초기 family 목록 조회 실패
    #[error("family listing failed: {0}")]
    FamilyListing(String),

    /// 백그라운드 태스크 join 실패
    #[error("task join failed: {0}")]
    Join(String),
}
