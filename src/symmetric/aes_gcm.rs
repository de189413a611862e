//! AES-GCM 对称加密实现
//!
//! 每个 AES 加解密器通过一个 [`KeyReader`] 读取密钥文件。加密器与解密器持有同一个
//! `Arc<KeyReader>`，因此在 [`KeyReader::reload`] 之后两端使用的密钥依然一致。

use crate::common::config::AesCryptorConfig;
use crate::common::traits::{CryptorPair, Decryptor, Encryptor};
use crate::common::utils::{ZeroizingVec, decode_input, encode_output};
use crate::error::Error;
use crate::factory::CryptorFactory;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use arc_swap::ArcSwap;
use base64::{Engine, engine::general_purpose};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use zeroize::{Zeroize, Zeroizing};

const KEY_SIZE: usize = 32;
const NONCE_SIZE: usize = 12;
const TAG_SIZE: usize = 16; // AES-GCM's tag is 16 bytes

/// AES-GCM 系统的独立错误类型
#[derive(Error, Debug)]
pub enum AesGcmSystemError {
    #[error("Key generation failed: {0}")]
    KeyGeneration(#[from] rand_core::OsError),

    #[error("Invalid key size: expected {expected}, got {actual}")]
    InvalidKeySize { expected: usize, actual: usize },

    #[error("Encryption failed")]
    EncryptionFailed,

    #[error("Decryption failed")]
    DecryptionFailed,

    #[error("Ciphertext is malformed or truncated: {0}")]
    MalformedCiphertext(String),

    #[error("Base64 decoding failed: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    #[error("key file {}: {source}", .path.display())]
    KeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// AES-256 密钥，离开作用域时自动擦除
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AesGcmKey(ZeroizingVec);

impl AesGcmKey {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, AesGcmSystemError> {
        if bytes.len() != KEY_SIZE {
            let actual = bytes.len();
            // Wrap first so the rejected bytes are still wiped.
            drop(ZeroizingVec(bytes));
            return Err(AesGcmSystemError::InvalidKeySize {
                expected: KEY_SIZE,
                actual,
            });
        }
        Ok(Self(ZeroizingVec(bytes)))
    }

    /// 解析密钥文件内容
    ///
    /// 优先按 base64 文本解析（忽略首尾空白），解码结果必须恰好 32 字节；
    /// 不是合法 base64 的内容按 32 字节原始密钥处理。
    pub fn from_file_contents(contents: &[u8]) -> Result<Self, AesGcmSystemError> {
        match general_purpose::STANDARD.decode(contents.trim_ascii()) {
            Ok(decoded) => Self::from_bytes(decoded),
            Err(_) if contents.len() == KEY_SIZE => Self::from_bytes(contents.to_vec()),
            Err(e) => Err(e.into()),
        }
    }

    /// 从 base64 文本导入密钥
    pub fn import(encoded: impl AsRef<[u8]>) -> Result<Self, AesGcmSystemError> {
        let key_bytes = general_purpose::STANDARD.decode(encoded.as_ref().trim_ascii())?;
        Self::from_bytes(key_bytes)
    }

    /// 导出为 base64 文本，即 [`KeyReader::create`] 写入的格式
    pub fn export(&self) -> Zeroizing<String> {
        Zeroizing::new(general_purpose::STANDARD.encode(&self.0))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// AES-GCM 对称加密系统
///
/// 密文布局：`nonce (12) || ciphertext || tag (16)`
#[derive(Debug)]
pub struct AesGcmSystem;

impl AesGcmSystem {
    pub const KEY_SIZE: usize = KEY_SIZE;

    pub fn generate_key() -> Result<AesGcmKey, AesGcmSystemError> {
        let mut key_bytes = vec![0u8; KEY_SIZE];
        use rand_core::{OsRng, TryRngCore};
        OsRng.try_fill_bytes(&mut key_bytes)?;
        AesGcmKey::from_bytes(key_bytes)
    }

    pub fn encrypt(key: &AesGcmKey, plaintext: &[u8]) -> Result<Vec<u8>, AesGcmSystemError> {
        let cipher = Self::cipher(key)?;
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let sealed = cipher
            .encrypt(&nonce, plaintext)
            .map_err(|_| AesGcmSystemError::EncryptionFailed)?;

        let mut output = Vec::with_capacity(NONCE_SIZE + sealed.len());
        output.extend_from_slice(nonce.as_slice());
        output.extend_from_slice(&sealed);
        Ok(output)
    }

    pub fn decrypt(key: &AesGcmKey, ciphertext: &[u8]) -> Result<Vec<u8>, AesGcmSystemError> {
        if ciphertext.len() < NONCE_SIZE + TAG_SIZE {
            return Err(AesGcmSystemError::MalformedCiphertext(format!(
                "expected at least {} bytes, got {}",
                NONCE_SIZE + TAG_SIZE,
                ciphertext.len()
            )));
        }
        let cipher = Self::cipher(key)?;
        let (nonce_slice, sealed) = ciphertext.split_at(NONCE_SIZE);
        cipher
            .decrypt(Nonce::from_slice(nonce_slice), sealed)
            .map_err(|_| AesGcmSystemError::DecryptionFailed)
    }

    fn cipher(key: &AesGcmKey) -> Result<Aes256Gcm, AesGcmSystemError> {
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| AesGcmSystemError::InvalidKeySize {
            expected: KEY_SIZE,
            actual: key.as_bytes().len(),
        })
    }
}

/// 读取 AES 密钥文件，并将密钥提供给基于它构建的加解密器
#[derive(Debug)]
pub struct KeyReader {
    path: PathBuf,
    key: ArcSwap<AesGcmKey>,
}

impl KeyReader {
    /// 读取并校验 `path` 处的密钥
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AesGcmSystemError> {
        let path = path.into();
        let key = Self::read_key(&path)?;
        debug!(path = %path.display(), "loaded AES key");
        Ok(Self {
            path,
            key: ArcSwap::from_pointee(key),
        })
    }

    /// 生成新密钥并写入 `path`（文件必须不存在），然后打开它
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, AesGcmSystemError> {
        let path = path.into();
        let key = AesGcmSystem::generate_key()?;
        write_key_file(&path, &key)?;
        info!(path = %path.display(), "generated new AES key file");
        Ok(Self {
            path,
            key: ArcSwap::from_pointee(key),
        })
    }

    /// 当前密钥。调用方在一次操作中持有返回的 `Arc`，并发重载不会使其中途变化
    pub fn key(&self) -> Arc<AesGcmKey> {
        self.key.load_full()
    }

    /// 重新读取密钥文件，失败时保留原密钥
    pub fn reload(&self) -> Result<(), AesGcmSystemError> {
        let key = Self::read_key(&self.path)?;
        self.key.store(Arc::new(key));
        info!(path = %self.path.display(), "reloaded AES key");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_key(path: &Path) -> Result<AesGcmKey, AesGcmSystemError> {
        let mut contents = std::fs::read(path).map_err(|source| AesGcmSystemError::KeyFile {
            path: path.to_path_buf(),
            source,
        })?;
        let key = AesGcmKey::from_file_contents(&contents);
        contents.zeroize();
        key
    }
}

/// 将密钥以 base64 文本写入新文件，Unix 下仅所有者可读写
pub fn write_key_file(path: &Path, key: &AesGcmKey) -> Result<(), AesGcmSystemError> {
    let to_err = |source| AesGcmSystemError::KeyFile {
        path: path.to_path_buf(),
        source,
    };

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(to_err)?;
    file.write_all(key.export().as_bytes()).map_err(to_err)?;
    file.sync_all().map_err(to_err)
}

/// AES 加密器
#[derive(Debug)]
pub struct AesEncryptor {
    key_reader: Arc<KeyReader>,
    binary_output: bool,
}

impl AesEncryptor {
    pub fn new(key_reader: Arc<KeyReader>, binary_output: bool) -> Self {
        Self {
            key_reader,
            binary_output,
        }
    }

    pub fn key_reader(&self) -> &Arc<KeyReader> {
        &self.key_reader
    }
}

impl Encryptor for AesEncryptor {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, Error> {
        let key = self.key_reader.key();
        let raw = AesGcmSystem::encrypt(&key, plaintext)?;
        Ok(encode_output(raw, self.binary_output))
    }

    fn algorithm(&self) -> &'static str {
        "aes-256-gcm"
    }
}

/// AES 解密器
#[derive(Debug)]
pub struct AesDecryptor {
    key_reader: Arc<KeyReader>,
    binary_output: bool,
}

impl AesDecryptor {
    pub fn new(key_reader: Arc<KeyReader>, binary_output: bool) -> Self {
        Self {
            key_reader,
            binary_output,
        }
    }

    pub fn key_reader(&self) -> &Arc<KeyReader> {
        &self.key_reader
    }
}

impl Decryptor for AesDecryptor {
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, Error> {
        let raw = decode_input(ciphertext, self.binary_output).map_err(AesGcmSystemError::from)?;
        let key = self.key_reader.key();
        Ok(AesGcmSystem::decrypt(&key, &raw)?)
    }

    fn algorithm(&self) -> &'static str {
        "aes-256-gcm"
    }
}

/// 围绕共享的 [`KeyReader`] 构建 AES 加解密器对
#[derive(Clone, Copy, Debug, Default)]
pub struct AesCryptorFactory;

impl CryptorFactory for AesCryptorFactory {
    type Config = AesCryptorConfig;

    fn kind(&self) -> &'static str {
        "aes"
    }

    fn build(&self, name: &str, config: &AesCryptorConfig) -> Result<CryptorPair, Error> {
        let key_reader =
            KeyReader::open(&config.key_path).map_err(|e| Error::configuration(name, e))?;
        Ok(Self::pair_from_reader(Arc::new(key_reader), config.binary_output))
    }
}

impl AesCryptorFactory {
    /// 基于调用方持有的 key reader 构建加解密器对，便于之后重载密钥
    pub fn pair_from_reader(key_reader: Arc<KeyReader>, binary_output: bool) -> CryptorPair {
        let encryptor = AesEncryptor::new(key_reader.clone(), binary_output);
        let decryptor = AesDecryptor::new(key_reader, binary_output);
        CryptorPair::new(Arc::new(encryptor), Arc::new(decryptor))
    }
}
