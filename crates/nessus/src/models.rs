//! Nessus REST API 와이어 타입
//!
//! 응답 JSON을 그대로 역직렬화하는 타입과, 이를 core 도메인 타입으로 바꾸는 변환을 정의합니다.
//! 서버 버전에 따라 빠지는 필드가 있어 대부분 `#[serde(default)]`를 사용합니다.

use serde::{Deserialize, Serialize};

use ironscan_core::types::{FamilyRef, PluginAttribute, PluginRecord, PluginRef};

/// `GET /plugins/families` 응답
#[derive(Debug, Clone, Deserialize)]
pub struct PluginFamilies {
    #[serde(default)]
    pub families: Vec<PluginFamily>,
}

/// family 목록 항목
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginFamily {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub count: u64,
}

impl From<PluginFamily> for FamilyRef {
    fn from(family: PluginFamily) -> Self {
        FamilyRef {
            id: family.id,
            name: family.name,
            count: family.count,
        }
    }
}

/// `GET /plugins/families/{id}` 응답
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyDetails {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub plugins: Vec<FamilyPlugin>,
}

impl FamilyDetails {
    /// 소속 plugin 목록을 참조로 변환합니다.
    pub fn plugin_refs(&self) -> Vec<PluginRef> {
        self.plugins
            .iter()
            .map(|p| PluginRef::new(p.id, self.id))
            .collect()
    }
}

/// family 상세의 plugin 항목
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyPlugin {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

/// `GET /plugins/plugin/{id}` 응답
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDetails {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub family_name: String,
    #[serde(default)]
    pub attributes: Vec<PluginDetailAttribute>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDetailAttribute {
    pub attribute_name: String,
    #[serde(default)]
    pub attribute_value: String,
}

impl From<PluginDetails> for PluginRecord {
    fn from(details: PluginDetails) -> Self {
        PluginRecord {
            id: details.id,
            name: details.name,
            family_name: details.family_name,
            attributes: details
                .attributes
                .into_iter()
                .map(|a| PluginAttribute {
                    name: a.attribute_name,
                    value: a.attribute_value,
                })
                .collect(),
        }
    }
}

/// `POST /session` 요청
#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// `POST /session` 응답
#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub token: String,
}

/// `GET /session` 응답
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub permissions: i64,
    #[serde(default)]
    pub lastlogin: i64,
    #[serde(default)]
    pub container_id: i64,
    #[serde(default)]
    pub groups: Option<Vec<String>>,
}

/// `GET /server/properties` 응답 (일부 필드)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerProperties {
    #[serde(default)]
    pub nessus_type: String,
    #[serde(default)]
    pub server_version: String,
    #[serde(default)]
    pub server_build: String,
    #[serde(default)]
    pub nessus_ui_version: String,
    #[serde(default)]
    pub loaded_plugin_set: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub feed: String,
}

/// `GET /server/status` 응답
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub progress: Option<i64>,
    /// 서버가 503을 돌려준 경우: 현재 세션을 폐기해야 함
    #[serde(skip_deserializing)]
    pub must_destroy_session: bool,
}
