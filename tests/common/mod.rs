//!
//! 集成测试的通用辅助函数
//!
#![allow(dead_code)]

use cryptor_kit::symmetric::KeyReader;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::rand_core::OsRng;
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// 2048 位 RSA 密钥对 (公钥 PEM, 私钥 PEM)，每个测试二进制只生成一次。
pub fn rsa_pems() -> &'static (String, String) {
    static KEYS: OnceLock<(String, String)> = OnceLock::new();
    KEYS.get_or_init(|| {
        let private_key = RsaPrivateKey::new(&mut OsRng, 2048).unwrap();
        let public_pem = RsaPublicKey::from(&private_key)
            .to_public_key_pem(LineEnding::LF)
            .unwrap();
        let private_pem = private_key.to_pkcs8_pem(LineEnding::LF).unwrap().to_string();
        (public_pem, private_pem)
    })
}

/// 将共享 RSA 密钥对写入 `dir`，文件名为 `<stem>.pub` / `<stem>.pem`。
pub fn write_rsa_pems(dir: &Path, stem: &str) -> (PathBuf, PathBuf) {
    let (public_pem, private_pem) = rsa_pems();
    let public_path = dir.join(format!("{}.pub", stem));
    let private_path = dir.join(format!("{}.pem", stem));
    std::fs::write(&public_path, public_pem).unwrap();
    std::fs::write(&private_path, private_pem).unwrap();
    (public_path, private_path)
}

/// 在 `dir/<name>.key` 生成新的 AES 密钥文件。
pub fn aes_key_file(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(format!("{}.key", name));
    KeyReader::create(&path).unwrap();
    path
}
