//! 按类型构建加密器/解密器对。

use crate::common::config::CryptorConfig;
use crate::common::traits::CryptorPair;
use crate::error::Result;

pub use crate::asymmetric::rsa::RsaCryptorFactory;
pub use crate::symmetric::aes_gcm::AesCryptorFactory;

/// 为指定类型的具名加解密器构建加密器/解密器对
///
/// 失败时返回携带 `name` 的 [`Error::Configuration`](crate::Error::Configuration)。
pub trait CryptorFactory {
    type Config;

    /// 工厂对应的配置类型键，例如 `"rsa"`
    fn kind(&self) -> &'static str;

    fn build(&self, name: &str, config: &Self::Config) -> Result<CryptorPair>;
}

/// 按配置变体分发到对应的工厂
pub fn build_pair(name: &str, config: &CryptorConfig) -> Result<CryptorPair> {
    match config {
        CryptorConfig::Rsa(config) => RsaCryptorFactory.build(name, config),
        CryptorConfig::Aes(config) => AesCryptorFactory.build(name, config),
    }
}
