//!
//! 集成测试
//!
//! 端到端绑定：输入 JSON 配置，得到可用的加密器与解密器注册表。
//!

mod common;

use base64::{Engine, engine::general_purpose};
use cryptor_kit::{
    BinderOptions, ConfigurationBinder, CryptorRegistry, CryptorsConfig, Error, Role,
};
use serde_json::json;
use std::sync::Arc;
use tempfile::tempdir;

#[test]
fn test_rsa_invoice_roundtrip_from_inline_pem() {
    let (public_pem, private_pem) = common::rsa_pems();
    let config = CryptorsConfig::from_value(json!({
        "cryptors": {
            "rsa": {
                "invoice": { "padding": 4, "public_key": public_pem, "private_key": private_pem }
            }
        }
    }))
    .unwrap();
    let registry = ConfigurationBinder::default().build(&config).unwrap();

    let encryptor = registry.get_encryptor("invoice").unwrap();
    let decryptor = registry.get_decryptor("invoice").unwrap();

    for message in [&b""[..], b"INV-2024-0001", &[0u8, 255, 1, 254, 2, 253], &[0x5a; 190]] {
        let ciphertext = encryptor.encrypt(message).unwrap();
        assert_eq!(decryptor.decrypt(&ciphertext).unwrap(), message);
    }
}

#[test]
fn test_rsa_keys_from_files_with_text_output() {
    let dir = tempdir().unwrap();
    let (public_path, private_path) = common::write_rsa_pems(dir.path(), "invoice");

    let document = json!({
        "defaults": { "rsa": { "binary_output": false } },
        "cryptors": {
            "rsa": {
                "invoice": { "padding": "pkcs1", "public_key": public_path, "private_key": private_path }
            }
        }
    });
    let mut registry = CryptorRegistry::new();
    ConfigurationBinder::default()
        .bind_value(document, &mut registry)
        .unwrap();

    let ciphertext = registry.get_encryptor("invoice").unwrap().encrypt(b"amount=10").unwrap();
    let decoded = general_purpose::STANDARD.decode(&ciphertext).unwrap();
    assert_eq!(decoded.len(), 256);

    let plaintext = registry.get_decryptor("invoice").unwrap().decrypt(&ciphertext).unwrap();
    assert_eq!(plaintext, b"amount=10");
}

#[test]
fn test_aes_session_text_output_roundtrip() {
    let dir = tempdir().unwrap();
    let key_path = common::aes_key_file(dir.path(), "session");

    let config = CryptorsConfig::from_value(json!({
        "cryptors": { "aes": { "session": { "key_path": key_path, "binary_output": false } } }
    }))
    .unwrap();
    let registry = ConfigurationBinder::default().build(&config).unwrap();

    let ciphertext = registry.get_encryptor("session").unwrap().encrypt(b"user=42;role=admin").unwrap();
    let text = String::from_utf8(ciphertext.clone()).expect("text output must be UTF-8");
    assert!(general_purpose::STANDARD.decode(&text).is_ok());

    let plaintext = registry.get_decryptor("session").unwrap().decrypt(text.as_bytes()).unwrap();
    assert_eq!(plaintext, b"user=42;role=admin");
}

#[test]
fn test_mixed_configuration_resolves_by_service_id() {
    let dir = tempdir().unwrap();
    let key_path = common::aes_key_file(dir.path(), "session");
    let (_, private_pem) = common::rsa_pems();

    let config = CryptorsConfig::from_value(json!({
        "namespace": "shop",
        "cryptors": {
            "rsa": { "invoice": { "private_key": private_pem } },
            "aes": { "session": { "key_path": key_path } }
        }
    }))
    .unwrap();
    let registry = ConfigurationBinder::default().build(&config).unwrap();

    assert_eq!(
        registry.service_ids().collect::<Vec<_>>(),
        [
            "shop.decryptor.invoice",
            "shop.decryptor.session",
            "shop.encryptor.invoice",
            "shop.encryptor.session",
        ]
    );

    let encryptor = registry.encryptor_service("shop.encryptor.invoice").unwrap();
    assert!(Arc::ptr_eq(&encryptor, &registry.get_encryptor("invoice").unwrap()));

    let decryptor = registry.decryptor_service("shop.decryptor.session").unwrap();
    let ciphertext = registry.get_encryptor("session").unwrap().encrypt(b"cart").unwrap();
    assert_eq!(decryptor.decrypt(&ciphertext).unwrap(), b"cart");
}

#[test]
fn test_cryptors_do_not_decrypt_each_other() {
    let dir = tempdir().unwrap();
    let first = common::aes_key_file(dir.path(), "first");
    let second = common::aes_key_file(dir.path(), "second");

    let config = CryptorsConfig::from_value(json!({
        "cryptors": { "aes": { "first": { "key_path": first }, "second": { "key_path": second } } }
    }))
    .unwrap();
    let registry = ConfigurationBinder::default().build(&config).unwrap();

    let ciphertext = registry.get_encryptor("first").unwrap().encrypt(b"secret").unwrap();
    assert!(matches!(
        registry.get_decryptor("second").unwrap().decrypt(&ciphertext),
        Err(Error::AesGcm(_))
    ));
}

#[test]
fn test_unsupported_type_fails_and_registers_nothing() {
    let dir = tempdir().unwrap();
    let key_path = common::aes_key_file(dir.path(), "session");

    let mut registry = CryptorRegistry::new();
    let result = ConfigurationBinder::default().bind_value(
        json!({
            "cryptors": {
                "aes": { "session": { "key_path": key_path } },
                "blowfish": { "legacy": { "key": "0123456789" } }
            }
        }),
        &mut registry,
    );

    let err = result.unwrap_err();
    assert!(matches!(&err, Error::UnsupportedType(t) if t == "blowfish"));
    assert!(err.to_string().contains("blowfish"));
    assert!(registry.is_empty());
}

#[test]
fn test_bad_rsa_key_is_attributed_to_cryptor() {
    let dir = tempdir().unwrap();
    let key_path = common::aes_key_file(dir.path(), "session");
    let garbage = dir.path().join("garbage.pem");
    std::fs::write(&garbage, "-----BEGIN PUBLIC KEY-----\nAAAA\n-----END PUBLIC KEY-----\n").unwrap();

    let config = CryptorsConfig::from_value(json!({
        "cryptors": {
            "aes": { "session": { "key_path": key_path } },
            "rsa": { "invoice": { "public_key": garbage } }
        }
    }))
    .unwrap();

    let mut registry = CryptorRegistry::new();
    let result = ConfigurationBinder::default().bind(&config, &mut registry);

    assert!(matches!(result, Err(Error::Configuration { ref name, .. }) if name == "invoice"));
    assert!(registry.is_empty());
}

#[test]
fn test_lookup_of_unregistered_name_fails() {
    let registry = ConfigurationBinder::default()
        .build(&CryptorsConfig::new())
        .unwrap();

    assert!(matches!(
        registry.get_encryptor("nope"),
        Err(Error::NotFound { role: Role::Encryptor, .. })
    ));
    assert!(matches!(
        registry.get_decryptor("nope"),
        Err(Error::NotFound { role: Role::Decryptor, .. })
    ));
}

#[test]
fn test_strict_binder_rejects_cross_type_duplicates() {
    let dir = tempdir().unwrap();
    let key_path = common::aes_key_file(dir.path(), "shared");
    let (public_pem, _) = common::rsa_pems();

    let config = CryptorsConfig::from_value(json!({
        "cryptors": {
            "aes": { "shared": { "key_path": key_path } },
            "rsa": { "shared": { "public_key": public_pem } }
        }
    }))
    .unwrap();

    let binder = ConfigurationBinder::new(BinderOptions {
        reject_duplicate_names: true,
    });
    assert!(matches!(binder.build(&config), Err(Error::DuplicateName(n)) if n == "shared"));
}

#[test]
fn test_config_file_roundtrip() {
    let dir = tempdir().unwrap();
    let key_path = common::aes_key_file(dir.path(), "session");
    let config_path = dir.path().join("cryptors.json");
    std::fs::write(
        &config_path,
        serde_json::to_string_pretty(&json!({
            "cryptors": { "aes": { "session": { "key_path": key_path, "binary_output": true } } }
        }))
        .unwrap(),
    )
    .unwrap();

    let config = CryptorsConfig::from_json_file(&config_path).unwrap();
    let registry = Arc::new(ConfigurationBinder::default().build(&config).unwrap());

    let handles: Vec<_> = (0..4u8)
        .map(|i| {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                let ciphertext = registry.get_encryptor("session").unwrap().encrypt(&[i; 64]).unwrap();
                registry.get_decryptor("session").unwrap().decrypt(&ciphertext).unwrap()
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), vec![i as u8; 64]);
    }
}

#[test]
fn test_openssl_oaep_ciphertext_decrypts_through_registry() {
    let fixtures = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let ciphertext = std::fs::read_to_string(fixtures.join("invoice_oaep_sha1.b64")).unwrap();

    let config = CryptorsConfig::from_value(json!({
        "cryptors": {
            "rsa": {
                "invoice": {
                    "padding": 4,
                    "public_key": fixtures.join("invoice_public.pem"),
                    "private_key": fixtures.join("invoice_encrypted.pem"),
                    "pass_phrase": "correct horse",
                    "binary_output": false
                }
            }
        }
    }))
    .unwrap();
    let registry = ConfigurationBinder::default().build(&config).unwrap();

    let decryptor = registry.decryptor_service("crypt.decryptor.invoice").unwrap();
    assert_eq!(decryptor.decrypt(ciphertext.as_bytes()).unwrap(), b"invoice #4711");

    let reply = registry.get_encryptor("invoice").unwrap().encrypt(b"paid").unwrap();
    assert_eq!(decryptor.decrypt(&reply).unwrap(), b"paid");
}

#[test]
fn test_document_namespace_must_match_registry() {
    let dir = tempdir().unwrap();
    let key_path = common::aes_key_file(dir.path(), "session");
    let document = json!({
        "namespace": "shop",
        "cryptors": { "aes": { "session": { "key_path": key_path } } }
    });

    let mut registry = CryptorRegistry::new();
    let result = ConfigurationBinder::default().bind_value(document.clone(), &mut registry);
    assert!(matches!(result, Err(Error::NamespaceMismatch { .. })));
    assert!(registry.is_empty());

    let config = CryptorsConfig::from_value(document).unwrap();
    let registry = ConfigurationBinder::default().build(&config).unwrap();
    assert!(registry.encryptor_service("shop.encryptor.session").is_ok());
    assert!(registry.encryptor_service("crypt.encryptor.session").is_err());
}
