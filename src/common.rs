//! 通用模块，包含配置、共享的 trait 与工具函数

pub mod config;
pub mod traits;
pub mod utils;

pub use self::config::{
    AesCryptorConfig, CryptorConfig, CryptorDefinition, CryptorKind, CryptorsConfig,
    RsaCryptorConfig,
};
pub use self::traits::{CryptorPair, Decryptor, Encryptor};
