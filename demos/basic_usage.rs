use cryptor_kit::symmetric::KeyReader;
use cryptor_kit::{ConfigurationBinder, CryptorsConfig};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 在临时目录中生成 AES 密钥文件
    let dir = tempfile::tempdir()?;
    let key_path = dir.path().join("session.key");
    KeyReader::create(&key_path)?;

    // 声明一个名为 "session" 的 AES 加密器，输出 base64 文本
    let config = CryptorsConfig::from_value(json!({
        "namespace": "demo",
        "cryptors": {
            "aes": { "session": { "key_path": key_path, "binary_output": false } }
        }
    }))?;
    let registry = ConfigurationBinder::default().build(&config)?;

    for id in registry.service_ids() {
        println!("Registered: {}", id);
    }

    // 加密
    let token = registry.get_encryptor("session")?.encrypt(b"Hello, Cryptor-Kit!")?;
    println!("Ciphertext: {}", String::from_utf8(token.clone())?);

    // 解密
    let plaintext = registry.decryptor_service("demo.decryptor.session")?.decrypt(&token)?;
    println!("Decrypted: {}", String::from_utf8(plaintext)?);

    Ok(())
}
