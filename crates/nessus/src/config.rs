//! Nessus 클라이언트 설정
//!
//! [`NessusClientConfig`]는 core의 [`NessusConfig`](ironscan_core::config::NessusConfig)에서
//! 파생되며, 빈 문자열 필드는 `Option`으로 정규화됩니다.

use std::path::PathBuf;
use std::time::Duration;

use ironscan_core::config::NessusConfig;

use crate::error::NessusError;

/// API 키 쌍 (X-ApiKeys 헤더)
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKeys {
    pub access_key: String,
    pub secret_key: String,
}

impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeys")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// 세션 로그인 자격 증명 (POST /session)
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Nessus 클라이언트 설정
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NessusClientConfig {
    /// API 기본 URL (예: `https://localhost:8834`)
    pub api_url: String,
    /// API 키 인증
    pub api_keys: Option<ApiKeys>,
    /// 세션 인증
    pub credentials: Option<Credentials>,
    /// 추가 신뢰 루트 인증서 (PEM)
    pub ca_cert_path: Option<PathBuf>,
    /// 인증서 검증 생략
    pub insecure: bool,
    /// 요청 타임아웃
    pub timeout: Duration,
    /// 요청/응답 디버그 로깅
    pub verbose: bool,
}

impl Default for NessusClientConfig {
    fn default() -> Self {
        Self::from_core(&NessusConfig::default())
    }
}

impl NessusClientConfig {
    /// core의 `NessusConfig`에서 설정을 생성합니다.
    pub fn from_core(core: &NessusConfig) -> Self {
        let api_keys = (!core.access_key.is_empty() && !core.secret_key.is_empty()).then(|| {
            ApiKeys {
                access_key: core.access_key.clone(),
                secret_key: core.secret_key.clone(),
            }
        });
        let credentials = (!core.username.is_empty()).then(|| Credentials {
            username: core.username.clone(),
            password: core.password.clone(),
        });
        let ca_cert_path = (!core.ca_cert_path.is_empty()).then(|| PathBuf::from(&core.ca_cert_path));

        Self {
            api_url: core.api_url.clone(),
            api_keys,
            credentials,
            ca_cert_path,
            insecure: core.insecure,
            timeout: Duration::from_secs(core.timeout_secs),
            verbose: core.verbose,
        }
    }

    /// 설정 값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), NessusError> {
        if self.api_url.trim().is_empty() {
            return Err(NessusError::Config {
                field: "api_url".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(NessusError::Config {
                field: "api_url".to_owned(),
                reason: "must start with http:// or https://".to_owned(),
            });
        }

        if self.timeout.is_zero() {
            return Err(NessusError::Config {
                field: "timeout".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if let Some(keys) = &self.api_keys
            && (keys.access_key.is_empty() || keys.secret_key.is_empty())
        {
            return Err(NessusError::Config {
                field: "api_keys".to_owned(),
                reason: "access_key and secret_key must both be set".to_owned(),
            });
        }

        Ok(())
    }
}

/// [`NessusClientConfig`] 빌더
#[derive(Default)]
pub struct NessusClientConfigBuilder {
    config: NessusClientConfig,
}

impl NessusClientConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    pub fn api_keys(mut self, access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        self.config.api_keys = Some(ApiKeys {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        });
        self
    }

    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.credentials = Some(Credentials {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    pub fn ca_cert_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.ca_cert_path = Some(path.into());
        self
    }

    /// 인증서 검증을 끕니다. 운영 환경에서 사용 금지.
    pub fn insecure(mut self, insecure: bool) -> Self {
        self.config.insecure = insecure;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    /// 설정을 검증하고 빌드합니다.
    pub fn build(self) -> Result<NessusClientConfig, NessusError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
