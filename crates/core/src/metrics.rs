//! 메트릭 상수
//!
//! 모든 메트릭의 이름을 중앙에서 정의합니다.
//! 각 크레이트는 이 상수를 사용하여 `metrics::counter!()`,
//! `metrics::histogram!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `ironscan_`
//! - 모듈명: `enumerator_`, `nessus_`
//! - 접미어: `_total` (counter), `_seconds` (histogram), 없음 (gauge)

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

/// HTTP 메서드 레이블 키
pub const LABEL_METHOD: &str = "method";

// ─── Enumerator 메트릭 ─────────────────────────────────────────────

/// Enumerator: 조회된 family 수 (counter)
pub const ENUMERATOR_FAMILIES_LISTED_TOTAL: &str = "ironscan_enumerator_families_listed_total";

/// Enumerator: 상세 조회에 실패해 버려진 family 수 (counter)
pub const ENUMERATOR_FAMILIES_FAILED_TOTAL: &str = "ironscan_enumerator_families_failed_total";

/// Enumerator: 큐에 들어간 plugin ID 수 (counter)
pub const ENUMERATOR_PLUGINS_QUEUED_TOTAL: &str = "ironscan_enumerator_plugins_queued_total";

/// Enumerator: 출력 스트림으로 전달된 plugin 수 (counter)
pub const ENUMERATOR_PLUGINS_EMITTED_TOTAL: &str = "ironscan_enumerator_plugins_emitted_total";

/// Enumerator: 상세 조회에 실패해 버려진 plugin 수 (counter)
pub const ENUMERATOR_PLUGINS_FAILED_TOTAL: &str = "ironscan_enumerator_plugins_failed_total";

/// Enumerator: 열거 1회 소요 시간 (histogram, 초)
pub const ENUMERATOR_RUN_DURATION_SECONDS: &str = "ironscan_enumerator_run_duration_seconds";

// ─── Nessus 클라이언트 메트릭 ──────────────────────────────────────

/// Nessus: 전송한 요청 수 (counter, label: method, result)
pub const NESSUS_REQUESTS_TOTAL: &str = "ironscan_nessus_requests_total";
