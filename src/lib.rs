//! # Cryptor-Kit: named encryptors and decryptors from configuration
//!
//! `cryptor-kit` turns a declarative list of cryptors into ready-to-use
//! encryption services. Each cryptor has a name, a type (`rsa` or `aes`) and
//! type-specific parameters; binding the configuration builds an encryptor and
//! a decryptor for every entry and registers them in a [`CryptorRegistry`].
//! The actual cryptography is delegated to the RustCrypto `rsa` and `aes-gcm`
//! crates.
//!
//! ## Core Concepts
//!
//! - **`CryptorsConfig`**: the validated cryptor list, loaded from JSON.
//! - **`ConfigurationBinder`**: builds every cryptor and fills a registry, all or nothing.
//! - **`CryptorRegistry`**: name and service-id lookup of `Encryptor` / `Decryptor` services.
//! - **`ServiceIdGenerator`**: stable ids of the form `<namespace>.<role>.<name>`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cryptor_kit::{ConfigurationBinder, CryptorsConfig};
//!
//! fn main() -> cryptor_kit::Result<()> {
//!     let config = CryptorsConfig::from_json_str(r#"{
//!         "cryptors": {
//!             "aes": { "session": { "key_path": "/etc/app/session.key", "binary_output": false } }
//!         }
//!     }"#)?;
//!     let registry = ConfigurationBinder::default().build(&config)?;
//!
//!     let token = registry.get_encryptor("session")?.encrypt(b"user=42")?;
//!     let plain = registry.get_decryptor("session")?.decrypt(&token)?;
//!     assert_eq!(plain, b"user=42");
//!     Ok(())
//! }
//! ```

pub mod asymmetric;
pub mod binder;
pub mod common;
pub mod error;
pub mod factory;
pub mod registry;
pub mod service_id;
pub mod symmetric;

pub use binder::{BinderOptions, ConfigurationBinder};
pub use common::config::{
    AesCryptorConfig, CryptorConfig, CryptorDefinition, CryptorKind, CryptorsConfig,
    RsaCryptorConfig,
};
pub use common::traits::{CryptorPair, Decryptor, Encryptor};
pub use error::{ConfigurationError, Error, Result};
pub use registry::CryptorRegistry;
pub use service_id::{DEFAULT_NAMESPACE, Role, ServiceIdGenerator};

/// The version of the `cryptor-kit` crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
