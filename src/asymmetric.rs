//! # 非对称加解密器
//!
//! RSA 公钥加密。本模块是非对称加解密器类型的统一入口，每个子模块提供
//! 底层算法封装、加密器/解密器对以及对应的工厂。

pub mod rsa;

pub use self::rsa::{RsaCryptoSystem, RsaCryptorFactory, RsaDecryptor, RsaEncryptor, RsaPadding};
