//! 도메인 타입 - 플러그인 카탈로그 계층 구조
//!
//! 원격 스캐너의 카탈로그는 2단 계층입니다.
//!
//! ```text
//! FamilyRef (family 목록)
//!    └── PluginRef (family 상세: 소속 plugin ID 목록)
//!           └── PluginRecord (plugin 상세)
//! ```
//!
//! 모든 값은 열거 1회 실행 동안만 존재하며 저장되지 않습니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Plugin family 참조
///
/// family 목록 조회 결과의 한 항목입니다. 파이프라인은 `id`만 사용합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyRef {
    /// family ID
    pub id: i64,
    /// family 이름
    pub name: String,
    /// 서버가 보고한 소속 plugin 수
    pub count: u64,
}

impl FamilyRef {
    /// ID만으로 참조를 생성합니다.
    pub fn new(id: i64) -> Self {
        Self {
            id,
            name: String::new(),
            count: 0,
        }
    }

    /// 이름을 지정합니다.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl fmt::Display for FamilyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "family[{}] {} ({} plugins)", self.id, self.name, self.count)
    }
}

/// Plugin 참조
///
/// family 상세 조회에서 생성되며, plugin ID 큐에 머무는 동안만 존재합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PluginRef {
    /// plugin ID
    pub id: i64,
    /// 소속 family ID
    pub family_id: i64,
}

impl PluginRef {
    pub fn new(id: i64, family_id: i64) -> Self {
        Self { id, family_id }
    }
}

impl fmt::Display for PluginRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "plugin[{}] (family {})", self.id, self.family_id)
    }
}

/// Plugin 속성 (이름-값 쌍)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginAttribute {
    pub name: String,
    pub value: String,
}

/// Plugin 상세 레코드
///
/// 워커가 생성하여 출력 스트림으로 소유권을 넘기고, 최종적으로 호출자가 소유합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginRecord {
    /// plugin ID
    pub id: i64,
    /// plugin 이름
    pub name: String,
    /// 소속 family 이름
    pub family_name: String,
    /// 속성 목록 (description, solution, cvss 등)
    pub attributes: Vec<PluginAttribute>,
}

impl PluginRecord {
    /// 이름으로 속성 값을 조회합니다.
    ///
    /// 같은 이름이 여러 번 나오면 첫 번째 값을 반환합니다.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}

impl fmt::Display for PluginRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.id, self.name, self.family_name)
    }
}
