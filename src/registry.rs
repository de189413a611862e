//! 已配置加密器与解密器的具名查找。
//!
//! 注册表在应用组装时填充一次，之后以只读方式共享（通常为 `Arc<CryptorRegistry>`）。
//! 注册需要 `&mut self`，注册表被共享引用持有后不能再添加条目。

use crate::common::traits::{Decryptor, Encryptor};
use crate::error::{Error, Result};
use crate::service_id::{Role, ServiceIdGenerator};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

#[derive(Default)]
pub struct CryptorRegistry {
    ids: ServiceIdGenerator,
    encryptors: HashMap<String, Arc<dyn Encryptor>>,
    decryptors: HashMap<String, Arc<dyn Decryptor>>,
    services: BTreeMap<String, (Role, String)>,
}

impl CryptorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用 `ids` 命名空间生成服务 id 的空注册表
    pub fn with_ids(ids: ServiceIdGenerator) -> Self {
        Self {
            ids,
            ..Self::default()
        }
    }

    pub fn ids(&self) -> &ServiceIdGenerator {
        &self.ids
    }

    /// 以 `name` 注册加密器，返回被替换的旧加密器
    pub fn add_encryptor(
        &mut self,
        name: impl Into<String>,
        encryptor: Arc<dyn Encryptor>,
    ) -> Option<Arc<dyn Encryptor>> {
        let name = name.into();
        self.index(Role::Encryptor, &name);
        self.encryptors.insert(name, encryptor)
    }

    /// 以 `name` 注册解密器，返回被替换的旧解密器
    pub fn add_decryptor(
        &mut self,
        name: impl Into<String>,
        decryptor: Arc<dyn Decryptor>,
    ) -> Option<Arc<dyn Decryptor>> {
        let name = name.into();
        self.index(Role::Decryptor, &name);
        self.decryptors.insert(name, decryptor)
    }

    pub fn get_encryptor(&self, name: &str) -> Result<Arc<dyn Encryptor>> {
        self.encryptors
            .get(name)
            .cloned()
            .ok_or_else(|| Error::not_found(Role::Encryptor, name))
    }

    pub fn get_decryptor(&self, name: &str) -> Result<Arc<dyn Decryptor>> {
        self.decryptors
            .get(name)
            .cloned()
            .ok_or_else(|| Error::not_found(Role::Decryptor, name))
    }

    /// 按服务 id 解析加密器，例如 `"crypt.encryptor.invoice"`
    pub fn encryptor_service(&self, service_id: &str) -> Result<Arc<dyn Encryptor>> {
        match self.services.get(service_id) {
            Some((Role::Encryptor, name)) => self.get_encryptor(name),
            _ => Err(Error::not_found(Role::Encryptor, service_id)),
        }
    }

    /// 按服务 id 解析解密器，例如 `"crypt.decryptor.invoice"`
    pub fn decryptor_service(&self, service_id: &str) -> Result<Arc<dyn Decryptor>> {
        match self.services.get(service_id) {
            Some((Role::Decryptor, name)) => self.get_decryptor(name),
            _ => Err(Error::not_found(Role::Decryptor, service_id)),
        }
    }

    pub fn contains(&self, role: Role, name: &str) -> bool {
        match role {
            Role::Encryptor => self.encryptors.contains_key(name),
            Role::Decryptor => self.decryptors.contains_key(name),
        }
    }

    /// 按字典序排列的已注册服务 id
    pub fn service_ids(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    /// 至少注册了一个角色的加解密器名称，已排序去重
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .encryptors
            .keys()
            .chain(self.decryptors.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// 已注册服务数量，每个角色分别计数
    pub fn len(&self) -> usize {
        self.encryptors.len() + self.decryptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encryptors.is_empty() && self.decryptors.is_empty()
    }

    fn index(&mut self, role: Role, name: &str) {
        self.services
            .insert(self.ids.generate(role, name), (role, name.to_string()));
    }
}

impl fmt::Debug for CryptorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CryptorRegistry")
            .field("namespace", &self.ids.namespace())
            .field("services", &self.services.keys().collect::<Vec<_>>())
            .finish()
    }
}
