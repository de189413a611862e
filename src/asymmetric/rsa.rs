//! RSA 加解密服务。
//!
//! `RsaCryptoSystem` 封装 `rsa` crate 的公钥加密；`RsaCryptorFactory` 根据
//! [`RsaCryptorConfig`] 构建共享同一个 [`RsaKeyPair`] 的加密器/解密器对。
//! 填充方式作为构造参数分别传给两端，密钥对本身不携带填充信息。

use crate::common::config::RsaCryptorConfig;
use crate::common::traits::{CryptorPair, Decryptor, Encryptor};
use crate::common::utils::{decode_input, encode_output};
use crate::error::Error;
use crate::factory::CryptorFactory;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::rand_core::OsRng as RsaOsRng;
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use serde::Deserialize;
use sha1::Sha1;
use sha2::Sha256;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use zeroize::Zeroizing;

const PEM_PREFIX: &str = "-----BEGIN";
const ENCRYPTED_PEM_LABEL: &str = "BEGIN ENCRYPTED PRIVATE KEY";
// OAEP overhead per block is 2 * digest length + 2.
const OAEP_SHA1_OVERHEAD: usize = 42;
const OAEP_SHA256_OVERHEAD: usize = 66;
const PKCS1_OVERHEAD: usize = 11;

/// RSA 系统的独立错误类型
#[derive(Error, Debug)]
pub enum RsaSystemError {
    #[error("invalid RSA key: {0}")]
    InvalidKey(String),

    #[error("neither a public nor a private key is configured")]
    NoKeyMaterial,

    #[error("no private key is configured, decryption is unavailable")]
    MissingPrivateKey,

    #[error("private key is encrypted but no pass_phrase is configured")]
    MissingPassPhrase,

    #[error("unsupported padding scheme: {0}")]
    UnsupportedPadding(String),

    #[error("RSA operation failed: {0}")]
    Crypto(#[from] rsa::Error),

    #[error("Base64 decoding failed: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    #[error("cannot read key file {}: {source}", .path.display())]
    KeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// RSA 填充方式
///
/// 配置中可使用 OpenSSL 常量（`1` = `OPENSSL_PKCS1_PADDING`，
/// `4` = `OPENSSL_PKCS1_OAEP_PADDING`）或名称（`"pkcs1"`、`"oaep"`、
/// `"oaep-sha256"`）。与 OpenSSL 一致，`4` / `"oaep"` 为 OAEP + SHA-1 + MGF1-SHA1；
/// `"oaep-sha256"` 没有对应的 OpenSSL 常量。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "PaddingSelector")]
pub enum RsaPadding {
    Pkcs1v15,
    #[default]
    Oaep,
    OaepSha256,
}

impl RsaPadding {
    pub const PKCS1_CODE: i64 = 1;
    pub const OAEP_CODE: i64 = 4;

    pub fn from_code(code: i64) -> Result<Self, RsaSystemError> {
        match code {
            Self::PKCS1_CODE => Ok(RsaPadding::Pkcs1v15),
            Self::OAEP_CODE => Ok(RsaPadding::Oaep),
            other => Err(RsaSystemError::UnsupportedPadding(other.to_string())),
        }
    }

    /// OpenSSL 常量，`OaepSha256` 没有对应值
    pub fn code(&self) -> Option<i64> {
        match self {
            RsaPadding::Pkcs1v15 => Some(Self::PKCS1_CODE),
            RsaPadding::Oaep => Some(Self::OAEP_CODE),
            RsaPadding::OaepSha256 => None,
        }
    }

    pub fn algorithm(&self) -> &'static str {
        match self {
            RsaPadding::Pkcs1v15 => "rsa-pkcs1v15",
            RsaPadding::Oaep => "rsa-oaep",
            RsaPadding::OaepSha256 => "rsa-oaep-sha256",
        }
    }

    fn overhead(&self) -> usize {
        match self {
            RsaPadding::Pkcs1v15 => PKCS1_OVERHEAD,
            RsaPadding::Oaep => OAEP_SHA1_OVERHEAD,
            RsaPadding::OaepSha256 => OAEP_SHA256_OVERHEAD,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PaddingSelector {
    Code(i64),
    Name(String),
}

impl TryFrom<PaddingSelector> for RsaPadding {
    type Error = RsaSystemError;

    fn try_from(selector: PaddingSelector) -> Result<Self, Self::Error> {
        match selector {
            PaddingSelector::Code(code) => RsaPadding::from_code(code),
            PaddingSelector::Name(name) => match name.to_ascii_lowercase().as_str() {
                "pkcs1" | "pkcs1v15" => Ok(RsaPadding::Pkcs1v15),
                "oaep" => Ok(RsaPadding::Oaep),
                "oaep-sha256" => Ok(RsaPadding::OaepSha256),
                _ => Err(RsaSystemError::UnsupportedPadding(name)),
            },
        }
    }
}

/// PEM 密钥来源：内联文本或磁盘文件
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum KeySource {
    Pem(String),
    File(PathBuf),
}

impl From<String> for KeySource {
    fn from(value: String) -> Self {
        if value.trim_start().starts_with(PEM_PREFIX) {
            KeySource::Pem(value)
        } else {
            KeySource::File(PathBuf::from(value))
        }
    }
}

impl fmt::Debug for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySource::Pem(_) => f.write_str("KeySource::Pem(<inline>)"),
            KeySource::File(path) => f.debug_tuple("KeySource::File").field(path).finish(),
        }
    }
}

impl KeySource {
    fn read(&self) -> Result<String, RsaSystemError> {
        match self {
            KeySource::Pem(pem) => Ok(pem.clone()),
            KeySource::File(path) => {
                debug!(path = %path.display(), "reading RSA key file");
                std::fs::read_to_string(path).map_err(|source| RsaSystemError::KeyFile {
                    path: path.clone(),
                    source,
                })
            }
        }
    }
}

/// 加密器与解密器共享的 RSA 密钥材料
///
/// 公钥总是存在（只配置私钥时由私钥推导）；私钥可选，仅配置公钥时得到只能加密的加解密器。
pub struct RsaKeyPair {
    public_key: RsaPublicKey,
    private_key: Option<RsaPrivateKey>,
}

impl RsaKeyPair {
    pub fn new(
        public_key: Option<RsaPublicKey>,
        private_key: Option<RsaPrivateKey>,
    ) -> Result<Self, RsaSystemError> {
        let public_key = match (public_key, &private_key) {
            (Some(public_key), Some(private_key)) => {
                if RsaPublicKey::from(private_key) != public_key {
                    return Err(RsaSystemError::InvalidKey(
                        "public key does not belong to the private key".to_string(),
                    ));
                }
                public_key
            }
            (Some(public_key), None) => public_key,
            (None, Some(private_key)) => RsaPublicKey::from(private_key),
            (None, None) => return Err(RsaSystemError::NoKeyMaterial),
        };
        Ok(Self {
            public_key,
            private_key,
        })
    }

    /// 读取并解析配置的密钥，`pass_phrase` 用于解密 `ENCRYPTED PRIVATE KEY`
    pub fn from_sources(
        public_key: Option<&KeySource>,
        private_key: Option<&KeySource>,
        pass_phrase: Option<&str>,
    ) -> Result<Self, RsaSystemError> {
        let public_key = public_key
            .map(|source| source.read().and_then(|pem| Self::parse_public_pem(&pem)))
            .transpose()?;
        let private_key = private_key
            .map(|source| -> Result<_, RsaSystemError> {
                let pem = Zeroizing::new(source.read()?);
                match pass_phrase {
                    Some(pass_phrase) => Self::parse_encrypted_private_pem(&pem, pass_phrase),
                    None => Self::parse_private_pem(&pem),
                }
            })
            .transpose()?;
        Self::new(public_key, private_key)
    }

    /// 支持 SPKI（`BEGIN PUBLIC KEY`）与 PKCS#1（`BEGIN RSA PUBLIC KEY`）
    pub fn parse_public_pem(pem: &str) -> Result<RsaPublicKey, RsaSystemError> {
        if pem.contains("BEGIN RSA PUBLIC KEY") {
            RsaPublicKey::from_pkcs1_pem(pem)
                .map_err(|e| RsaSystemError::InvalidKey(format!("PKCS#1 public key: {}", e)))
        } else {
            RsaPublicKey::from_public_key_pem(pem)
                .map_err(|e| RsaSystemError::InvalidKey(format!("public key: {}", e)))
        }
    }

    /// 支持 PKCS#8（`BEGIN PRIVATE KEY`）与 PKCS#1（`BEGIN RSA PRIVATE KEY`）
    pub fn parse_private_pem(pem: &str) -> Result<RsaPrivateKey, RsaSystemError> {
        if pem.contains(ENCRYPTED_PEM_LABEL) {
            Err(RsaSystemError::MissingPassPhrase)
        } else if pem.contains("BEGIN RSA PRIVATE KEY") {
            RsaPrivateKey::from_pkcs1_pem(pem)
                .map_err(|e| RsaSystemError::InvalidKey(format!("PKCS#1 private key: {}", e)))
        } else {
            RsaPrivateKey::from_pkcs8_pem(pem)
                .map_err(|e| RsaSystemError::InvalidKey(format!("private key: {}", e)))
        }
    }

    /// 解析 PKCS#8 加密私钥；未加密的私钥忽略口令直接解析
    pub fn parse_encrypted_private_pem(
        pem: &str,
        pass_phrase: &str,
    ) -> Result<RsaPrivateKey, RsaSystemError> {
        if !pem.contains(ENCRYPTED_PEM_LABEL) {
            return Self::parse_private_pem(pem);
        }
        RsaPrivateKey::from_pkcs8_encrypted_pem(pem, pass_phrase)
            .map_err(|e| RsaSystemError::InvalidKey(format!("encrypted private key: {}", e)))
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    pub fn private_key(&self) -> Result<&RsaPrivateKey, RsaSystemError> {
        self.private_key
            .as_ref()
            .ok_or(RsaSystemError::MissingPrivateKey)
    }

    pub fn has_private_key(&self) -> bool {
        self.private_key.is_some()
    }

    /// 模数位数
    pub fn bits(&self) -> usize {
        self.public_key.size() * 8
    }
}

impl fmt::Debug for RsaKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaKeyPair")
            .field("bits", &self.bits())
            .field("has_private_key", &self.has_private_key())
            .finish()
    }
}

/// RSA加密系统实现
pub struct RsaCryptoSystem;

impl RsaCryptoSystem {
    pub fn encrypt(
        public_key: &RsaPublicKey,
        padding: RsaPadding,
        plaintext: &[u8],
    ) -> Result<Vec<u8>, RsaSystemError> {
        let mut rng = RsaOsRng;
        let ciphertext = match padding {
            RsaPadding::Pkcs1v15 => public_key.encrypt(&mut rng, Pkcs1v15Encrypt, plaintext)?,
            RsaPadding::Oaep => public_key.encrypt(&mut rng, Oaep::new::<Sha1>(), plaintext)?,
            RsaPadding::OaepSha256 => {
                public_key.encrypt(&mut rng, Oaep::new::<Sha256>(), plaintext)?
            }
        };
        Ok(ciphertext)
    }

    pub fn decrypt(
        private_key: &RsaPrivateKey,
        padding: RsaPadding,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, RsaSystemError> {
        let plaintext = match padding {
            RsaPadding::Pkcs1v15 => private_key.decrypt(Pkcs1v15Encrypt, ciphertext)?,
            RsaPadding::Oaep => private_key.decrypt(Oaep::new::<Sha1>(), ciphertext)?,
            RsaPadding::OaepSha256 => private_key.decrypt(Oaep::new::<Sha256>(), ciphertext)?,
        };
        Ok(plaintext)
    }

    /// 在给定密钥与填充下单次加密允许的最大明文长度
    pub fn max_plaintext_len(public_key: &RsaPublicKey, padding: RsaPadding) -> usize {
        public_key.size().saturating_sub(padding.overhead())
    }
}

/// RSA 加密器
#[derive(Debug)]
pub struct RsaEncryptor {
    keys: Arc<RsaKeyPair>,
    padding: RsaPadding,
    binary_output: bool,
}

impl RsaEncryptor {
    pub fn new(keys: Arc<RsaKeyPair>, padding: RsaPadding, binary_output: bool) -> Self {
        Self {
            keys,
            padding,
            binary_output,
        }
    }

    pub fn key_pair(&self) -> &Arc<RsaKeyPair> {
        &self.keys
    }

    pub fn padding(&self) -> RsaPadding {
        self.padding
    }
}

impl Encryptor for RsaEncryptor {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, Error> {
        let raw = RsaCryptoSystem::encrypt(self.keys.public_key(), self.padding, plaintext)?;
        Ok(encode_output(raw, self.binary_output))
    }

    fn algorithm(&self) -> &'static str {
        self.padding.algorithm()
    }
}

/// RSA 解密器
#[derive(Debug)]
pub struct RsaDecryptor {
    keys: Arc<RsaKeyPair>,
    padding: RsaPadding,
    binary_output: bool,
}

impl RsaDecryptor {
    pub fn new(keys: Arc<RsaKeyPair>, padding: RsaPadding, binary_output: bool) -> Self {
        Self {
            keys,
            padding,
            binary_output,
        }
    }

    pub fn key_pair(&self) -> &Arc<RsaKeyPair> {
        &self.keys
    }

    pub fn padding(&self) -> RsaPadding {
        self.padding
    }
}

impl Decryptor for RsaDecryptor {
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, Error> {
        let private_key = self.keys.private_key()?;
        let raw = decode_input(ciphertext, self.binary_output).map_err(RsaSystemError::from)?;
        Ok(RsaCryptoSystem::decrypt(private_key, self.padding, &raw)?)
    }

    fn algorithm(&self) -> &'static str {
        self.padding.algorithm()
    }
}

/// 构建 RSA 加解密器对
#[derive(Clone, Copy, Debug, Default)]
pub struct RsaCryptorFactory;

impl CryptorFactory for RsaCryptorFactory {
    type Config = RsaCryptorConfig;

    fn kind(&self) -> &'static str {
        "rsa"
    }

    fn build(&self, name: &str, config: &RsaCryptorConfig) -> Result<CryptorPair, Error> {
        let keys = RsaKeyPair::from_sources(
            config.public_key.as_ref(),
            config.private_key.as_ref(),
            config.pass_phrase.as_deref().map(String::as_str),
        )
        .map_err(|e| Error::configuration(name, e))?;
        debug!(
            cryptor = name,
            bits = keys.bits(),
            padding = config.padding.algorithm(),
            decrypt = keys.has_private_key(),
            "built RSA key pair"
        );

        let keys = Arc::new(keys);
        let encryptor = RsaEncryptor::new(keys.clone(), config.padding, config.binary_output);
        let decryptor = RsaDecryptor::new(keys, config.padding, config.binary_output);
        Ok(CryptorPair::new(Arc::new(encryptor), Arc::new(decryptor)))
    }
}
