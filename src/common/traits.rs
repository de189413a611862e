//! 定义了加解密服务对外暴露的核心 Trait。
use crate::error::Error;
use std::sync::Arc;

/// 已配置的加密服务
///
/// 实现持有（或共享）密钥材料，调用方只接触明文输入与密文输出，密文表示由配置决定。
pub trait Encryptor: Send + Sync {
    /// 加密 `plaintext`
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, Error>;

    /// 底层算法的简短标识，例如 `"rsa-oaep"`
    fn algorithm(&self) -> &'static str;
}

/// 已配置的解密服务，与 [`Encryptor`] 对应
pub trait Decryptor: Send + Sync {
    /// 解密由对应加密器产生的值
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, Error>;

    /// 底层算法的简短标识
    fn algorithm(&self) -> &'static str;
}

/// 为同一个具名加解密器一起构建的加密器与解密器
#[derive(Clone)]
pub struct CryptorPair {
    pub encryptor: Arc<dyn Encryptor>,
    pub decryptor: Arc<dyn Decryptor>,
}

impl CryptorPair {
    pub fn new(encryptor: Arc<dyn Encryptor>, decryptor: Arc<dyn Decryptor>) -> Self {
        Self {
            encryptor,
            decryptor,
        }
    }
}

impl std::fmt::Debug for CryptorPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptorPair")
            .field("encryptor", &self.encryptor.algorithm())
            .field("decryptor", &self.decryptor.algorithm())
            .finish()
    }
}
