//! 将加解密器配置绑定到 [`CryptorRegistry`]。
//!
//! 绑定分三个阶段：加载（解析并校验文档）、分发（构建每个加密器/解密器对）、注册。
//! 所有加解密器对构建成功之前不会注册任何条目，失败的配置不会留下部分填充的注册表。

use crate::common::config::{CryptorDefinition, CryptorsConfig};
use crate::common::traits::CryptorPair;
use crate::error::{Error, Result};
use crate::factory::build_pair;
use crate::registry::CryptorRegistry;
use crate::service_id::{Role, ServiceIdGenerator};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BinderOptions {
    /// 名称重复声明或已存在于注册表时返回 [`Error::DuplicateName`]，而不是覆盖
    pub reject_duplicate_names: bool,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigurationBinder {
    options: BinderOptions,
}

impl ConfigurationBinder {
    pub fn new(options: BinderOptions) -> Self {
        Self { options }
    }

    /// 拒绝重复名称的绑定器
    pub fn strict() -> Self {
        Self::new(BinderOptions {
            reject_duplicate_names: true,
        })
    }

    pub fn options(&self) -> BinderOptions {
        self.options
    }

    /// 以配置中的命名空间创建新注册表并绑定 `config`
    pub fn build(&self, config: &CryptorsConfig) -> Result<CryptorRegistry> {
        let mut registry = CryptorRegistry::with_ids(ServiceIdGenerator::new(&config.namespace));
        self.bind(config, &mut registry)?;
        Ok(registry)
    }

    /// 加载 JSON 文档并绑定到 `registry`
    pub fn bind_value(&self, document: Value, registry: &mut CryptorRegistry) -> Result<usize> {
        let config = CryptorsConfig::from_value(document)?;
        self.bind(&config, registry)
    }

    /// 构建 `config` 中的全部加解密器并注册到 `registry`，返回注册数量。
    ///
    /// 配置的命名空间必须与注册表一致，否则在构建任何加解密器之前返回
    /// [`Error::NamespaceMismatch`]。
    pub fn bind(&self, config: &CryptorsConfig, registry: &mut CryptorRegistry) -> Result<usize> {
        if config.namespace != registry.ids().namespace() {
            return Err(Error::NamespaceMismatch {
                configured: config.namespace.clone(),
                registry: registry.ids().namespace().to_string(),
            });
        }
        if self.options.reject_duplicate_names {
            Self::check_duplicates(config, registry)?;
        }

        debug!(count = config.len(), "building cryptors");
        let pairs = config
            .cryptors
            .iter()
            .map(|definition| -> Result<_> {
                Ok((definition, build_pair(&definition.name, &definition.config)?))
            })
            .collect::<Result<Vec<(&CryptorDefinition, CryptorPair)>>>()?;

        let count = pairs.len();
        for (definition, pair) in pairs {
            Self::register(registry, definition, pair);
        }
        Ok(count)
    }

    fn check_duplicates(config: &CryptorsConfig, registry: &CryptorRegistry) -> Result<()> {
        let mut seen = HashSet::new();
        for definition in &config.cryptors {
            let name = definition.name.as_str();
            let registered = registry.contains(Role::Encryptor, name)
                || registry.contains(Role::Decryptor, name);
            if !seen.insert(name) || registered {
                return Err(Error::DuplicateName(name.to_string()));
            }
        }
        Ok(())
    }

    fn register(registry: &mut CryptorRegistry, definition: &CryptorDefinition, pair: CryptorPair) {
        let name = definition.name.as_str();
        let algorithm = pair.encryptor.algorithm();

        let replaced_encryptor = registry.add_encryptor(name, pair.encryptor);
        let replaced_decryptor = registry.add_decryptor(name, pair.decryptor);
        if replaced_encryptor.is_some() || replaced_decryptor.is_some() {
            warn!(cryptor = name, "cryptor name declared more than once, replacing the earlier one");
        }

        info!(
            cryptor = name,
            kind = %definition.config.kind(),
            algorithm,
            encryptor = %registry.ids().encryptor_id(name),
            decryptor = %registry.ids().decryptor_id(name),
            "registered cryptor"
        );
    }
}
