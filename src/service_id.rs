//! 已注册加解密器的稳定服务标识。
//!
//! 每个加解密器按角色暴露两个 id：`"<namespace>.encryptor.<name>"` 与
//! `"<namespace>.decryptor.<name>"`。外部调用方依赖这些字符串解析加解密器，格式在版本之间保持不变。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 配置未指定时使用的命名空间
pub const DEFAULT_NAMESPACE: &str = "crypt";

/// 服务 id 指向的加解密器一端
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Encryptor,
    Decryptor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Encryptor => "encryptor",
            Role::Decryptor => "decryptor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 加解密服务 id 生成器
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceIdGenerator {
    namespace: String,
}

impl Default for ServiceIdGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl ServiceIdGenerator {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// 生成 `name` 在指定角色下的服务 id
    pub fn generate(&self, role: Role, name: &str) -> String {
        format!("{}.{}.{}", self.namespace, role, name)
    }

    pub fn encryptor_id(&self, name: &str) -> String {
        self.generate(Role::Encryptor, name)
    }

    pub fn decryptor_id(&self, name: &str) -> String {
        self.generate(Role::Decryptor, name)
    }

    /// 将 [`generate`](Self::generate) 生成的 id 拆回角色与名称，其他命名空间的 id 返回 `None`
    pub fn parse<'a>(&self, service_id: &'a str) -> Option<(Role, &'a str)> {
        let rest = service_id
            .strip_prefix(self.namespace.as_str())?
            .strip_prefix('.')?;
        [Role::Encryptor, Role::Decryptor].into_iter().find_map(|role| {
            rest.strip_prefix(role.as_str())
                .and_then(|r| r.strip_prefix('.'))
                .filter(|name| !name.is_empty())
                .map(|name| (role, name))
        })
    }
}
