//! 원격 플러그인 카탈로그 추상화
//!
//! [`PluginCatalog`]는 열거 파이프라인이 의존하는 세 가지 원격 호출만 노출합니다.
//! 인증, TLS, 전송 설정은 구현체(`ironscan-nessus::NessusClient`)가 책임지며
//! 파이프라인은 이미 구성된 카탈로그를 받아 사용합니다.
//!
//! ```text
//! ┌──────────────────┐
//! │ PluginEnumerator │
//! └────────┬─────────┘
//!          │
//!          ▼
//!   ┌──────────────┐
//!   │PluginCatalog │ (trait)
//!   └──────────────┘
//!        │     │
//!        ▼     ▼
//!   ┌──────┐ ┌──────────┐
//!   │Nessus│ │In-memory │
//!   └──┬───┘ └──────────┘
//!      │
//!      ▼
//!   Nessus REST API
//! ```

use std::future::Future;
use std::sync::Arc;

use crate::error::CatalogError;
use crate::types::{FamilyRef, PluginRecord, PluginRef};

/// 원격 카탈로그 호출 trait
///
/// `Send + Sync + 'static`이므로 `Arc`로 감싸 여러 태스크에서 동시에 호출할 수 있습니다.
/// 구현체는 동시 호출에 안전해야 합니다.
pub trait PluginCatalog: Send + Sync + 'static {
    /// 전체 family 목록을 조회합니다.
    ///
    /// 열거 1회당 한 번, 다른 작업이 스케줄되기 전에 호출됩니다.
    fn list_families(&self)
    -> impl Future<Output = Result<Vec<FamilyRef>, CatalogError>> + Send;

    /// 한 family에 속한 plugin ID 목록을 조회합니다.
    fn family_plugins(
        &self,
        family_id: i64,
    ) -> impl Future<Output = Result<Vec<PluginRef>, CatalogError>> + Send;

    /// 한 plugin의 상세 레코드를 조회합니다.
    fn plugin_details(
        &self,
        plugin_id: i64,
    ) -> impl Future<Output = Result<PluginRecord, CatalogError>> + Send;
}

impl<C: PluginCatalog> PluginCatalog for Arc<C> {
    fn list_families(
        &self,
    ) -> impl Future<Output = Result<Vec<FamilyRef>, CatalogError>> + Send {
        (**self).list_families()
    }

    fn family_plugins(
        &self,
        family_id: i64,
    ) -> impl Future<Output = Result<Vec<PluginRef>, CatalogError>> + Send {
        (**self).family_plugins(family_id)
    }

    fn plugin_details(
        &self,
        plugin_id: i64,
    ) -> impl Future<Output = Result<PluginRecord, CatalogError>> + Send {
        (**self).plugin_details(plugin_id)
    }
}
