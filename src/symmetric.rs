//! 对称加密核心模块

pub mod aes_gcm;

pub use self::aes_gcm::{AesCryptorFactory, AesDecryptor, AesEncryptor, AesGcmSystem, KeyReader};
