//!
//! # 通用配置模块
//!
//! 声明式的加解密器配置。文档按类型分组列出加解密器，可为每种类型提供
//! `defaults`，同类型的加解密器未覆盖的字段会继承默认值：
//!
//! ```json
//! {
//!   "namespace": "crypt",
//!   "defaults": { "rsa": { "padding": 4 } },
//!   "cryptors": {
//!     "rsa": { "invoice": { "public_key": "/keys/invoice.pub", "private_key": "/keys/invoice.pem" } },
//!     "aes": { "session": { "key_path": "/keys/session.key", "binary_output": false } }
//!   }
//! }
//! ```
//!
//! 加载时一次性完成校验：未知类型返回 [`Error::UnsupportedType`]，
//! 格式错误的条目返回带有加解密器名称的 [`Error::Configuration`]。
//!
use crate::asymmetric::rsa::{KeySource, RsaPadding};
use crate::error::{ConfigurationError, Error, Result};
use crate::service_id::DEFAULT_NAMESPACE;
use serde::Deserialize;
use serde::de::Error as _;
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;
use zeroize::Zeroizing;

/// [`CryptorsConfig::from_env`] 读取的配置文件路径变量
pub const CONFIG_PATH_ENV: &str = "CRYPTOR_KIT_CONFIG";
/// 覆盖已加载配置的命名空间
pub const NAMESPACE_ENV: &str = "CRYPTOR_KIT_NAMESPACE";

/// 支持的加解密器类型
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CryptorKind {
    Rsa,
    Aes,
}

impl CryptorKind {
    pub fn parse(kind: &str) -> Result<Self> {
        match kind {
            "rsa" => Ok(CryptorKind::Rsa),
            "aes" => Ok(CryptorKind::Aes),
            other => Err(Error::UnsupportedType(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CryptorKind::Rsa => "rsa",
            CryptorKind::Aes => "aes",
        }
    }
}

impl fmt::Display for CryptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_rsa_binary_output() -> bool {
    true
}

/// RSA 加解密配置
#[derive(Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RsaCryptorConfig {
    /// 填充方式，OpenSSL 常量或名称，默认 OAEP
    #[serde(default)]
    pub padding: RsaPadding,
    /// 内联 PEM 或 PEM 文件路径
    #[serde(default)]
    pub public_key: Option<KeySource>,
    /// 内联 PEM 或 PEM 文件路径
    #[serde(default)]
    pub private_key: Option<KeySource>,
    /// 加密私钥（`ENCRYPTED PRIVATE KEY`）的口令
    #[serde(default)]
    pub pass_phrase: Option<Zeroizing<String>>,
    /// 返回原始密文字节而非 base64 文本
    #[serde(default = "default_rsa_binary_output")]
    pub binary_output: bool,
}

impl Default for RsaCryptorConfig {
    fn default() -> Self {
        Self {
            padding: RsaPadding::default(),
            public_key: None,
            private_key: None,
            pass_phrase: None,
            binary_output: default_rsa_binary_output(),
        }
    }
}

impl fmt::Debug for RsaCryptorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaCryptorConfig")
            .field("padding", &self.padding)
            .field("public_key", &self.public_key)
            .field("private_key", &self.private_key)
            .field("pass_phrase", &self.pass_phrase.as_ref().map(|_| "[REDACTED]"))
            .field("binary_output", &self.binary_output)
            .finish()
    }
}

/// AES 加解密配置
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AesCryptorConfig {
    pub key_path: PathBuf,
    #[serde(default)]
    pub binary_output: bool,
}

/// 单个加解密器的类型参数
#[derive(Clone, Debug, PartialEq)]
pub enum CryptorConfig {
    Rsa(RsaCryptorConfig),
    Aes(AesCryptorConfig),
}

impl CryptorConfig {
    pub fn kind(&self) -> CryptorKind {
        match self {
            CryptorConfig::Rsa(_) => CryptorKind::Rsa,
            CryptorConfig::Aes(_) => CryptorKind::Aes,
        }
    }
}

impl From<RsaCryptorConfig> for CryptorConfig {
    fn from(config: RsaCryptorConfig) -> Self {
        CryptorConfig::Rsa(config)
    }
}

impl From<AesCryptorConfig> for CryptorConfig {
    fn from(config: AesCryptorConfig) -> Self {
        CryptorConfig::Aes(config)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CryptorDefinition {
    pub name: String,
    pub config: CryptorConfig,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDocument {
    #[serde(default)]
    namespace: Option<String>,
    #[serde(default)]
    defaults: Map<String, Value>,
    #[serde(default)]
    cryptors: Map<String, Value>,
}

/// 经过校验的加解密器列表，保持声明顺序
#[derive(Clone, Debug, PartialEq)]
pub struct CryptorsConfig {
    pub namespace: String,
    pub cryptors: Vec<CryptorDefinition>,
}

impl Default for CryptorsConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            cryptors: Vec::new(),
        }
    }
}

impl CryptorsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_cryptor(mut self, name: impl Into<String>, config: impl Into<CryptorConfig>) -> Self {
        self.cryptors.push(CryptorDefinition {
            name: name.into(),
            config: config.into(),
        });
        self
    }

    pub fn from_json_str(document: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(document)?;
        Self::from_value(value)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading cryptor configuration");
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// 读取 `CRYPTOR_KIT_CONFIG` 指向的文件，若设置了 `CRYPTOR_KIT_NAMESPACE` 则覆盖命名空间
    pub fn from_env() -> Result<Self> {
        let path = std::env::var_os(CONFIG_PATH_ENV).ok_or(Error::MissingEnv(CONFIG_PATH_ENV))?;
        let mut config = Self::from_json_file(path)?;
        if let Ok(namespace) = std::env::var(NAMESPACE_ENV) {
            config.namespace = namespace;
        }
        Ok(config)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let raw: RawDocument = serde_json::from_value(value)?;

        // Reject unknown types before looking at any entry.
        let groups = raw
            .cryptors
            .iter()
            .map(|(kind, entries)| -> Result<_> { Ok((CryptorKind::parse(kind)?, entries)) })
            .collect::<Result<Vec<_>>>()?;
        for kind in raw.defaults.keys() {
            CryptorKind::parse(kind)?;
        }

        let mut cryptors = Vec::new();
        for (kind, entries) in groups {
            let entries = entries.as_object().ok_or_else(|| {
                serde_json::Error::custom(format!("cryptors.{} must be an object", kind))
            })?;
            let defaults = match raw.defaults.get(kind.as_str()) {
                Some(Value::Object(defaults)) => defaults.clone(),
                Some(_) => {
                    return Err(serde_json::Error::custom(format!(
                        "defaults.{} must be an object",
                        kind
                    ))
                    .into());
                }
                None => Map::new(),
            };

            for (name, params) in entries {
                let config = Self::parse_entry(kind, name, &defaults, params)?;
                cryptors.push(CryptorDefinition {
                    name: name.clone(),
                    config,
                });
            }
        }

        Ok(Self {
            namespace: raw.namespace.unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            cryptors,
        })
    }

    fn parse_entry(
        kind: CryptorKind,
        name: &str,
        defaults: &Map<String, Value>,
        params: &Value,
    ) -> Result<CryptorConfig> {
        let invalid = |reason: String| Error::configuration(name, ConfigurationError::Invalid(reason));

        if name.is_empty() {
            return Err(invalid("cryptor name must not be empty".to_string()));
        }
        let overrides = params
            .as_object()
            .ok_or_else(|| invalid("parameters must be an object".to_string()))?;

        let mut merged = defaults.clone();
        merged.extend(overrides.clone());
        let merged = Value::Object(merged);

        let config = match kind {
            CryptorKind::Rsa => CryptorConfig::Rsa(
                serde_json::from_value(merged).map_err(|e| invalid(e.to_string()))?,
            ),
            CryptorKind::Aes => CryptorConfig::Aes(
                serde_json::from_value(merged).map_err(|e| invalid(e.to_string()))?,
            ),
        };
        Ok(config)
    }

    pub fn len(&self) -> usize {
        self.cryptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cryptors.is_empty()
    }
}
