//! 配置值解析与类型转换
//!
//! 配置值依赖在生成阶段求值：解析器把字面表达式求值为文本，
//! 再按声明的基础类型转换，转换结果以字面量形式写入生成代码。

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 配置值可转换的目标类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    /// 字符串
    String,
    /// 布尔值
    Bool,
    /// 单个字符
    Char,
    /// i8
    I8,
    /// i16
    I16,
    /// i32
    I32,
    /// i64
    I64,
    /// u8
    U8,
    /// u16
    U16,
    /// u32
    U32,
    /// u64
    U64,
    /// usize
    Usize,
    /// f32
    F32,
    /// f64
    F64,
}

impl PrimitiveType {
    /// 对应的 Rust 类型名
    pub fn rust_name(self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Bool => "bool",
            Self::Char => "char",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::Usize => "usize",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }

    /// 从 Rust 类型名解析
    pub fn from_rust_name(name: &str) -> Option<Self> {
        let parsed = match name.trim() {
            "String" | "std::string::String" | "&str" => Self::String,
            "bool" => Self::Bool,
            "char" => Self::Char,
            "i8" => Self::I8,
            "i16" => Self::I16,
            "i32" => Self::I32,
            "i64" => Self::I64,
            "u8" => Self::U8,
            "u16" => Self::U16,
            "u32" => Self::U32,
            "u64" => Self::U64,
            "usize" => Self::Usize,
            "f32" => Self::F32,
            "f64" => Self::F64,
            _ => return None,
        };
        Some(parsed)
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rust_name())
    }
}

/// 转换后的配置值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ConfiguredValue {
    /// 字符串
    String(String),
    /// 布尔值
    Bool(bool),
    /// 字符
    Char(char),
    /// i8
    I8(i8),
    /// i16
    I16(i16),
    /// i32
    I32(i32),
    /// i64
    I64(i64),
    /// u8
    U8(u8),
    /// u16
    U16(u16),
    /// u32
    U32(u32),
    /// u64
    U64(u64),
    /// usize
    Usize(usize),
    /// f32
    F32(f32),
    /// f64
    F64(f64),
}

impl ConfiguredValue {
    /// 值的类型
    pub fn primitive_type(&self) -> PrimitiveType {
        match self {
            Self::String(_) => PrimitiveType::String,
            Self::Bool(_) => PrimitiveType::Bool,
            Self::Char(_) => PrimitiveType::Char,
            Self::I8(_) => PrimitiveType::I8,
            Self::I16(_) => PrimitiveType::I16,
            Self::I32(_) => PrimitiveType::I32,
            Self::I64(_) => PrimitiveType::I64,
            Self::U8(_) => PrimitiveType::U8,
            Self::U16(_) => PrimitiveType::U16,
            Self::U32(_) => PrimitiveType::U32,
            Self::U64(_) => PrimitiveType::U64,
            Self::Usize(_) => PrimitiveType::Usize,
            Self::F32(_) => PrimitiveType::F32,
            Self::F64(_) => PrimitiveType::F64,
        }
    }
}

fn parse_number<T: std::str::FromStr>(
    text: &str,
    target: PrimitiveType,
) -> Result<T, ConfigError> {
    text.trim()
        .parse::<T>()
        .map_err(|_| ConfigError::type_conversion(text, target))
}

/// 把文本转换为目标类型
pub fn convert_value(text: &str, target: PrimitiveType) -> Result<ConfiguredValue, ConfigError> {
    let value = match target {
        PrimitiveType::String => ConfiguredValue::String(text.to_string()),
        PrimitiveType::Bool => match text.trim().to_ascii_lowercase().as_str() {
            "true" => ConfiguredValue::Bool(true),
            "false" => ConfiguredValue::Bool(false),
            _ => return Err(ConfigError::type_conversion(text, target)),
        },
        PrimitiveType::Char => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => ConfiguredValue::Char(c),
                _ => return Err(ConfigError::type_conversion(text, target)),
            }
        }
        PrimitiveType::I8 => ConfiguredValue::I8(parse_number(text, target)?),
        PrimitiveType::I16 => ConfiguredValue::I16(parse_number(text, target)?),
        PrimitiveType::I32 => ConfiguredValue::I32(parse_number(text, target)?),
        PrimitiveType::I64 => ConfiguredValue::I64(parse_number(text, target)?),
        PrimitiveType::U8 => ConfiguredValue::U8(parse_number(text, target)?),
        PrimitiveType::U16 => ConfiguredValue::U16(parse_number(text, target)?),
        PrimitiveType::U32 => ConfiguredValue::U32(parse_number(text, target)?),
        PrimitiveType::U64 => ConfiguredValue::U64(parse_number(text, target)?),
        PrimitiveType::Usize => ConfiguredValue::Usize(parse_number(text, target)?),
        PrimitiveType::F32 => ConfiguredValue::F32(parse_number(text, target)?),
        PrimitiveType::F64 => ConfiguredValue::F64(parse_number(text, target)?),
    };
    Ok(value)
}

/// 配置解析器
///
/// 把字面表达式求值为文本，由外部提供实现。
pub trait ConfigurationResolver: Send + Sync {
    /// 求值表达式
    fn resolve(&self, expression: &str) -> Result<String, ConfigError>;

    /// 求值并转换为目标类型
    fn resolve_as(
        &self,
        expression: &str,
        target: PrimitiveType,
    ) -> Result<ConfiguredValue, ConfigError> {
        let text = self.resolve(expression)?;
        convert_value(&text, target)
    }
}

/// 不展开占位符的解析器，直接返回表达式本身
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralResolver;

impl ConfigurationResolver for LiteralResolver {
    fn resolve(&self, expression: &str) -> Result<String, ConfigError> {
        Ok(expression.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_numbers() {
        assert_eq!(
            convert_value("8080", PrimitiveType::U16).unwrap(),
            ConfiguredValue::U16(8080)
        );
        assert_eq!(
            convert_value(" -5 ", PrimitiveType::I32).unwrap(),
            ConfiguredValue::I32(-5)
        );
        assert_eq!(
            convert_value("2.5", PrimitiveType::F64).unwrap(),
            ConfiguredValue::F64(2.5)
        );
    }

    #[test]
    fn test_convert_rejects_overflow_and_garbage() {
        let err = convert_value("70000", PrimitiveType::U16).unwrap_err();
        assert!(matches!(err, ConfigError::TypeConversionError { .. }));
        assert!(err.to_string().contains("70000"));
        assert!(err.to_string().contains("u16"));

        assert!(convert_value("abc", PrimitiveType::I64).is_err());
        assert!(convert_value("yes", PrimitiveType::Bool).is_err());
    }

    #[test]
    fn test_convert_bool_and_char() {
        assert_eq!(
            convert_value("TRUE", PrimitiveType::Bool).unwrap(),
            ConfiguredValue::Bool(true)
        );
        assert_eq!(
            convert_value("x", PrimitiveType::Char).unwrap(),
            ConfiguredValue::Char('x')
        );
        assert!(convert_value("xy", PrimitiveType::Char).is_err());
        assert!(convert_value("", PrimitiveType::Char).is_err());
    }

    #[test]
    fn test_rust_name_round_trip() {
        assert_eq!(PrimitiveType::from_rust_name("u64"), Some(PrimitiveType::U64));
        assert_eq!(PrimitiveType::from_rust_name("String"), Some(PrimitiveType::String));
        assert_eq!(PrimitiveType::from_rust_name("Vec<u8>"), None);
    }
}
