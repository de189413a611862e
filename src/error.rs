//! 定义 `cryptor-kit` crate 的错误类型。

use crate::service_id::Role;
use thiserror::Error;

use crate::asymmetric::rsa::RsaSystemError;
use crate::symmetric::aes_gcm::AesGcmSystemError;

/// 单个具名加解密器加载或构建失败的原因
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("invalid parameters: {0}")]
    Invalid(String),

    #[error(transparent)]
    Rsa(#[from] RsaSystemError),

    #[error(transparent)]
    AesGcm(#[from] AesGcmSystemError),
}

/// `cryptor-kit` 的主错误类型
#[derive(Error, Debug)]
pub enum Error {
    #[error("the cryptor type \"{0}\" is not supported")]
    UnsupportedType(String),

    #[error("cryptor \"{name}\" is misconfigured: {source}")]
    Configuration {
        name: String,
        #[source]
        source: ConfigurationError,
    },

    #[error("no {role} registered under \"{name}\"")]
    NotFound { role: Role, name: String },

    #[error("cryptor name \"{0}\" is declared more than once")]
    DuplicateName(String),

    #[error("configuration namespace \"{configured}\" does not match registry namespace \"{registry}\"")]
    NamespaceMismatch { configured: String, registry: String },

    #[error("malformed configuration document: {0}")]
    Document(#[from] serde_json::Error),

    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RSA error: {0}")]
    Rsa(#[from] RsaSystemError),

    #[error("AES-GCM error: {0}")]
    AesGcm(#[from] AesGcmSystemError),
}

impl Error {
    /// 为加载或构建失败附加出错的加解密器名称
    pub fn configuration(name: impl Into<String>, source: impl Into<ConfigurationError>) -> Self {
        Error::Configuration {
            name: name.into(),
            source: source.into(),
        }
    }

    pub(crate) fn not_found(role: Role, name: &str) -> Self {
        Error::NotFound {
            role,
            name: name.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_unsupported_type_names_the_type() {
        let err = Error::UnsupportedType("blowfish".to_string());
        assert!(err.to_string().contains("\"blowfish\""));
    }

    #[test]
    fn test_configuration_error_keeps_source() {
        let err = Error::configuration("invoice", ConfigurationError::Invalid("missing field `key_path`".into()));
        assert!(err.to_string().contains("\"invoice\""));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_io_error_shows_cause() {
        let err = Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "cryptors.json missing"));
        assert_eq!(err.to_string(), "I/O error: cryptors.json missing");
    }

    #[test]
    fn test_not_found_mentions_role() {
        let err = Error::not_found(Role::Decryptor, "session");
        assert_eq!(err.to_string(), "no decryptor registered under \"session\"");
    }
}
