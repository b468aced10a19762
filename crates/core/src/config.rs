//! 설정 관리 - ironscan.toml 파싱 및 런타임 설정
//!
//! [`IronscanConfig`]는 모든 크레이트의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`IRONSCAN_NESSUS_API_URL=https://scanner:8834` 형식)
//! 3. 설정 파일 (`ironscan.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), ironscan_core::error::IronscanError> {
//! use ironscan_core::config::IronscanConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = IronscanConfig::load("ironscan.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = IronscanConfig::parse("[enumeration]\nworkers = 4")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, IronscanError};

/// 워커 수 상한
pub const MAX_WORKERS: usize = 256;

/// 채널 용량 상한
pub const MAX_CHANNEL_CAPACITY: usize = 65_536;

/// Ironscan 통합 설정
///
/// `ironscan.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 크레이트는 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IronscanConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// Nessus 접속 설정
    #[serde(default)]
    pub nessus: NessusConfig,
    /// 플러그인 열거 설정
    #[serde(default)]
    pub enumeration: EnumerationConfig,
}

impl IronscanConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, IronscanError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, IronscanError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                IronscanError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                IronscanError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, IronscanError> {
        toml::from_str(toml_str).map_err(|e| {
            IronscanError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `IRONSCAN_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "IRONSCAN_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "IRONSCAN_GENERAL_LOG_FORMAT");

        // Nessus
        override_string(&mut self.nessus.api_url, "IRONSCAN_NESSUS_API_URL");
        override_string(&mut self.nessus.access_key, "IRONSCAN_NESSUS_ACCESS_KEY");
        override_string(&mut self.nessus.secret_key, "IRONSCAN_NESSUS_SECRET_KEY");
        override_string(&mut self.nessus.username, "IRONSCAN_NESSUS_USERNAME");
        override_string(&mut self.nessus.password, "IRONSCAN_NESSUS_PASSWORD");
        override_string(&mut self.nessus.ca_cert_path, "IRONSCAN_NESSUS_CA_CERT_PATH");
        override_bool(&mut self.nessus.insecure, "IRONSCAN_NESSUS_INSECURE");
        override_u64(&mut self.nessus.timeout_secs, "IRONSCAN_NESSUS_TIMEOUT_SECS");
        override_bool(&mut self.nessus.verbose, "IRONSCAN_NESSUS_VERBOSE");

        // Enumeration
        override_usize(&mut self.enumeration.workers, "IRONSCAN_ENUMERATION_WORKERS");
        override_usize(
            &mut self.enumeration.id_queue_capacity,
            "IRONSCAN_ENUMERATION_ID_QUEUE_CAPACITY",
        );
        override_usize(
            &mut self.enumeration.output_capacity,
            "IRONSCAN_ENUMERATION_OUTPUT_CAPACITY",
        );
        override_usize(
            &mut self.enumeration.family_concurrency,
            "IRONSCAN_ENUMERATION_FAMILY_CONCURRENCY",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), IronscanError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.nessus.api_url.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "nessus.api_url".to_owned(),
                reason: "must not be empty".to_owned(),
            }
            .into());
        }

        if !self.nessus.api_url.starts_with("http://") && !self.nessus.api_url.starts_with("https://")
        {
            return Err(ConfigError::InvalidValue {
                field: "nessus.api_url".to_owned(),
                reason: "must start with http:// or https://".to_owned(),
            }
            .into());
        }

        // API 키는 짝으로만 의미가 있음
        if self.nessus.access_key.is_empty() != self.nessus.secret_key.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "nessus.access_key".to_owned(),
                reason: "access_key and secret_key must be set together".to_owned(),
            }
            .into());
        }

        if self.nessus.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "nessus.timeout_secs".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        if self.enumeration.workers == 0 || self.enumeration.workers > MAX_WORKERS {
            return Err(ConfigError::InvalidValue {
                field: "enumeration.workers".to_owned(),
                reason: format!("must be 1-{MAX_WORKERS}"),
            }
            .into());
        }

        for (field, value) in [
            (
                "enumeration.id_queue_capacity",
                self.enumeration.id_queue_capacity,
            ),
            (
                "enumeration.output_capacity",
                self.enumeration.output_capacity,
            ),
        ] {
            if value == 0 || value > MAX_CHANNEL_CAPACITY {
                return Err(ConfigError::InvalidValue {
                    field: field.to_owned(),
                    reason: format!("must be 1-{MAX_CHANNEL_CAPACITY}"),
                }
                .into());
            }
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// Nessus 접속 설정
///
/// API 키(`access_key`/`secret_key`)와 세션 로그인(`username`/`password`)을
/// 모두 지원합니다. 둘 다 설정되면 두 헤더가 함께 전송됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NessusConfig {
    /// API 기본 URL
    pub api_url: String,
    /// API access key
    pub access_key: String,
    /// API secret key
    pub secret_key: String,
    /// 세션 로그인 사용자명
    pub username: String,
    /// 세션 로그인 비밀번호
    pub password: String,
    /// 추가 신뢰 루트 인증서 (PEM) 경로
    pub ca_cert_path: String,
    /// 인증서 검증 생략 (운영 환경에서 사용 금지)
    pub insecure: bool,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
    /// 요청/응답 디버그 로깅
    pub verbose: bool,
}

impl Default for NessusConfig {
    fn default() -> Self {
        Self {
            api_url: "https://localhost:8834".to_owned(),
            access_key: String::new(),
            secret_key: String::new(),
            username: String::new(),
            password: String::new(),
            ca_cert_path: String::new(),
            insecure: false,
            timeout_secs: 60,
            verbose: false,
        }
    }
}

/// 플러그인 열거 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumerationConfig {
    /// plugin 상세 조회 워커 수
    pub workers: usize,
    /// plugin ID 큐 용량
    pub id_queue_capacity: usize,
    /// 출력 스트림 버퍼 용량
    pub output_capacity: usize,
    /// 동시 family 조회 상한 (0이면 family마다 태스크 하나, 상한 없음)
    pub family_concurrency: usize,
}

impl Default for EnumerationConfig {
    fn default() -> Self {
        Self {
            workers: 10,
            id_queue_capacity: 20,
            output_capacity: 20,
            family_concurrency: 0,
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
