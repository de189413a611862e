use base64::{Engine, engine::general_purpose};
use std::ops::Deref;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// 自动清零的字节向量，用于私钥等敏感数据
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct ZeroizingVec(pub Vec<u8>);

impl Deref for ZeroizingVec {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<[u8]> for ZeroizingVec {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for ZeroizingVec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ZeroizingVec([REDACTED; {}])", self.0.len())
    }
}

/// 将原始密文转换为返回给调用方的表示
///
/// `binary_output` 为真时原样返回字节，否则使用标准 base64（带填充）编码。
pub fn encode_output(raw: Vec<u8>, binary_output: bool) -> Vec<u8> {
    if binary_output {
        raw
    } else {
        general_purpose::STANDARD.encode(raw).into_bytes()
    }
}

/// [`encode_output`] 的逆操作，base64 文本的首尾 ASCII 空白会被忽略
pub fn decode_input(input: &[u8], binary_output: bool) -> Result<Vec<u8>, base64::DecodeError> {
    if binary_output {
        Ok(input.to_vec())
    } else {
        general_purpose::STANDARD.decode(input.trim_ascii())
    }
}
