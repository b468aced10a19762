//! Ironscan 공통 크레이트
//!
//! 모든 크레이트가 공유하는 도메인 타입, 원격 카탈로그 trait, 에러, 설정,
//! 메트릭 이름을 정의합니다.

pub mod catalog;
pub mod config;
pub mod error;
pub mod metrics;
pub mod types;

// --- 주요 타입 re-export ---
// 각 모듈의 핵심 타입을 크레이트 루트에서 바로 사용할 수 있도록 합니다.

// 에러
pub use error::{CatalogError, ConfigError, IronscanError, PipelineError};

// 설정
pub use config::{EnumerationConfig, GeneralConfig, IronscanConfig, NessusConfig};

// 카탈로그 trait
pub use catalog::PluginCatalog;

// 도메인 타입
pub use types::{FamilyRef, PluginAttribute, PluginRecord, PluginRef};
