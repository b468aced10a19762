//! Ironscan Nessus 클라이언트
//!
//! Nessus REST API를 호출하는 [`NessusClient`]를 제공합니다.
//! 클라이언트는 [`PluginCatalog`](ironscan_core::PluginCatalog)를 구현하므로
//! `ironscan-enumerator`의 원격 카탈로그로 바로 사용할 수 있습니다.
//!
//! # 모듈 구성
//!
//! - [`client`]: HTTP 요청, 인증 헤더, 엔드포인트 메서드
//! - [`config`]: 클라이언트 설정과 빌더
//! - [`models`]: 응답 와이어 타입과 도메인 타입 변환
//! - [`error`]: 에러 타입

pub mod client;
pub mod config;
pub mod error;
pub mod models;

pub use client::NessusClient;
pub use config::{ApiKeys, Credentials, NessusClientConfig, NessusClientConfigBuilder};
pub use error::NessusError;
pub use models::{
    FamilyDetails, FamilyPlugin, PluginDetailAttribute, PluginDetails, PluginFamily,
    ServerProperties, ServerStatus, Session,
};
