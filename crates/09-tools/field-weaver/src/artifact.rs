//! 组件构件模型
//!
//! 编译后组件的平台中立表示：字段表和方法表，方法体为栈机指令序列。
//! 构件以 JSON 保存，织入器读入、修改后按相同格式写回。

use infrastructure_common::{Modifiers, Visibility, WeaveError, WeaveResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 字段值类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// 布尔
    Boolean,
    /// 8 位整数
    Byte,
    /// 字符
    Char,
    /// 16 位整数
    Short,
    /// 32 位整数
    Int,
    /// 64 位整数，占两个槽
    Long,
    /// 32 位浮点
    Float,
    /// 64 位浮点，占两个槽
    Double,
    /// 引用类型
    Reference(String),
    /// 数组
    Array(Box<FieldType>),
}

impl FieldType {
    /// 类型描述符
    pub fn descriptor(&self) -> String {
        match self {
            Self::Boolean => "Z".to_string(),
            Self::Byte => "B".to_string(),
            Self::Char => "C".to_string(),
            Self::Short => "S".to_string(),
            Self::Int => "I".to_string(),
            Self::Long => "J".to_string(),
            Self::Float => "F".to_string(),
            Self::Double => "D".to_string(),
            Self::Reference(name) => format!("L{};", name.replace("::", "/")),
            Self::Array(element) => format!("[{}", element.descriptor()),
        }
    }

    /// 是否为 64 位值类型
    pub fn is_wide(&self) -> bool {
        matches!(self, Self::Long | Self::Double)
    }

    /// 在求值栈和局部变量表中占用的槽数
    pub fn slot_size(&self) -> u16 {
        if self.is_wide() {
            2
        } else {
            1
        }
    }

    /// 装载该类型值的指令
    pub fn load_opcode(&self) -> LoadOpcode {
        match self {
            Self::Boolean | Self::Byte | Self::Char | Self::Short | Self::Int => LoadOpcode::Iload,
            Self::Long => LoadOpcode::Lload,
            Self::Float => LoadOpcode::Fload,
            Self::Double => LoadOpcode::Dload,
            Self::Reference(_) | Self::Array(_) => LoadOpcode::Aload,
        }
    }
}

/// 局部变量装载指令
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadOpcode {
    /// 整数类
    Iload,
    /// 64 位整数
    Lload,
    /// 32 位浮点
    Fload,
    /// 64 位浮点
    Dload,
    /// 引用
    Aload,
}

/// 方法体指令
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Instruction {
    /// 装载局部变量
    Load {
        /// 装载指令
        opcode: LoadOpcode,
        /// 局部变量槽
        slot: u16,
    },
    /// 写实例字段
    PutField {
        /// 字段所属类型
        owner: String,
        /// 字段名
        name: String,
        /// 字段描述符
        descriptor: String,
    },
    /// 写静态字段
    PutStatic {
        /// 字段所属类型
        owner: String,
        /// 字段名
        name: String,
        /// 字段描述符
        descriptor: String,
    },
    /// 无返回值返回
    Return,
    /// 织入器不关心的其他指令
    Raw {
        /// 指令文本
        text: String,
    },
}

/// 字段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldEntry {
    /// 字段名
    pub name: String,
    /// 值类型
    pub field_type: FieldType,
    /// 可见性
    #[serde(default)]
    pub visibility: Visibility,
    /// 修饰符
    #[serde(default)]
    pub modifiers: Modifiers,
    /// 是否为注入目标
    #[serde(default)]
    pub injected: bool,
}

impl FieldEntry {
    /// 创建私有字段
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            visibility: Visibility::Private,
            modifiers: Modifiers::default(),
            injected: false,
        }
    }

    /// 标记为注入目标
    pub fn injected(mut self) -> Self {
        self.injected = true;
        self
    }

    /// 设置可见性
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// 标记为静态字段
    pub fn static_field(mut self) -> Self {
        self.modifiers.is_static = true;
        self
    }

    /// 标记为不可变字段
    pub fn immutable(mut self) -> Self {
        self.modifiers.is_immutable = true;
        self
    }

    /// 是否需要织入访问器
    pub fn needs_accessor(&self) -> bool {
        self.injected && !self.visibility.is_public()
    }
}

/// 方法访问标志
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodAccess {
    /// 公开
    pub is_public: bool,
    /// 静态
    pub is_static: bool,
    /// 编译器合成
    pub is_synthetic: bool,
}

/// 方法
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodEntry {
    /// 方法名
    pub name: String,
    /// 方法描述符，例如 `(J)V`
    pub descriptor: String,
    /// 访问标志
    #[serde(default)]
    pub access: MethodAccess,
    /// 求值栈深度上限
    #[serde(default)]
    pub max_stack: u16,
    /// 局部变量表大小
    #[serde(default)]
    pub max_locals: u16,
    /// 指令序列
    #[serde(default)]
    pub instructions: Vec<Instruction>,
}

/// 组件构件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentArtifact {
    /// 组件类型的完全限定名称
    pub type_name: String,
    /// 字段表
    #[serde(default)]
    pub fields: Vec<FieldEntry>,
    /// 方法表
    #[serde(default)]
    pub methods: Vec<MethodEntry>,
}

impl ComponentArtifact {
    /// 创建空构件
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// 添加字段
    pub fn with_field(mut self, field: FieldEntry) -> Self {
        self.fields.push(field);
        self
    }

    /// 添加方法
    pub fn with_method(mut self, method: MethodEntry) -> Self {
        self.methods.push(method);
        self
    }

    /// 按名称查找方法
    pub fn method(&self, name: &str) -> Option<&MethodEntry> {
        self.methods.iter().find(|method| method.name == name)
    }

    /// 按名称查找字段
    pub fn field(&self, name: &str) -> Option<&FieldEntry> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// 字段所属类型的内部名称
    pub fn internal_name(&self) -> String {
        self.type_name.replace("::", "/")
    }

    /// 从 JSON 字节解析
    pub fn from_bytes(bytes: &[u8]) -> WeaveResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| WeaveError::invalid_artifact(e.to_string()))
    }

    /// 序列化为 JSON 字节，输出稳定
    pub fn to_bytes(&self) -> WeaveResult<Vec<u8>> {
        let mut bytes =
            serde_json::to_vec_pretty(self).map_err(|e| WeaveError::invalid_artifact(e.to_string()))?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

impl fmt::Display for ComponentArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} 个字段, {} 个方法)",
            self.type_name,
            self.fields.len(),
            self.methods.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptors() {
        assert_eq!(FieldType::Long.descriptor(), "J");
        assert_eq!(FieldType::Boolean.descriptor(), "Z");
        assert_eq!(
            FieldType::Reference("shop::Repository".into()).descriptor(),
            "Lshop/Repository;"
        );
        assert_eq!(FieldType::Array(Box::new(FieldType::Int)).descriptor(), "[I");
    }

    #[test]
    fn test_wide_types_take_two_slots() {
        assert_eq!(FieldType::Long.slot_size(), 2);
        assert_eq!(FieldType::Double.slot_size(), 2);
        assert_eq!(FieldType::Float.slot_size(), 1);
        assert_eq!(FieldType::Reference("a::B".into()).slot_size(), 1);
        assert_eq!(FieldType::Double.load_opcode(), LoadOpcode::Dload);
        assert_eq!(FieldType::Char.load_opcode(), LoadOpcode::Iload);
    }

    #[test]
    fn test_parse_minimal_artifact() {
        let json = r#"{
            "type_name": "shop::OrderService",
            "fields": [
                { "name": "repo", "field_type": { "reference": "shop::Repo" }, "injected": true }
            ]
        }"#;
        let artifact = ComponentArtifact::from_bytes(json.as_bytes()).unwrap();
        let field = artifact.field("repo").unwrap();
        assert_eq!(field.visibility, Visibility::Private);
        assert!(field.needs_accessor());
        assert!(artifact.methods.is_empty());

        assert!(ComponentArtifact::from_bytes(b"{ not json").is_err());
    }
}
