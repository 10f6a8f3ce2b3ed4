//! 字段访问器织入
//!
//! 为需要注入的非公开字段添加只执行一次字段写入的合成访问器
//! `__di_set_<field>`。不可变字段先去掉不可变标记。访问器已存在时跳过，
//! 因此重复织入的输出与织入一次完全相同。

use crate::artifact::{ComponentArtifact, FieldEntry, Instruction, LoadOpcode, MethodAccess, MethodEntry};
use infrastructure_common::{accessor_name, WeaveError, WeaveResult};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// 构件文件扩展名
pub const ARTIFACT_EXTENSION: &str = "artifact.json";

/// 单个构件的织入结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeavingResult {
    /// 无需修改
    Unchanged {
        /// 组件类型
        type_name: String,
    },
    /// 已添加访问器
    Modified {
        /// 组件类型
        type_name: String,
        /// 织入后的构件字节
        bytes: Vec<u8>,
        /// 新增的访问器
        added: Vec<String>,
    },
    /// 织入失败
    Error {
        /// 组件类型，无法解析时为空
        type_name: String,
        /// 错误信息
        message: String,
    },
}

impl WeavingResult {
    /// 组件类型
    pub fn type_name(&self) -> &str {
        match self {
            Self::Unchanged { type_name }
            | Self::Modified { type_name, .. }
            | Self::Error { type_name, .. } => type_name,
        }
    }

    /// 是否修改了构件
    pub fn was_modified(&self) -> bool {
        matches!(self, Self::Modified { .. })
    }

    /// 是否失败
    pub fn has_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// 织入后的构件字节
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Modified { bytes, .. } => Some(bytes),
            _ => None,
        }
    }

    /// 新增的访问器
    pub fn added_accessors(&self) -> &[String] {
        match self {
            Self::Modified { added, .. } => added,
            _ => &[],
        }
    }

    /// 错误信息
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error { message, .. } => Some(message),
            _ => None,
        }
    }
}

impl fmt::Display for WeavingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unchanged { type_name } => write!(f, "{type_name}: unchanged"),
            Self::Modified {
                type_name, added, ..
            } => write!(f, "{type_name}: modified, setters [{}]", added.join(", ")),
            Self::Error { type_name, message } => write!(f, "{type_name}: ERROR {message}"),
        }
    }
}

/// 字段访问器织入器
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldAccessorWeaver;

impl FieldAccessorWeaver {
    /// 创建织入器
    pub fn new() -> Self {
        Self
    }

    /// 在构件上添加缺失的访问器，返回新增访问器的说明
    pub fn weave(&self, artifact: &mut ComponentArtifact) -> WeaveResult<Vec<String>> {
        let owner = artifact.internal_name();
        let mut added = Vec::new();

        for index in 0..artifact.fields.len() {
            if !artifact.fields[index].needs_accessor() {
                continue;
            }
            let setter = setter(&owner, &artifact.fields[index]);

            if let Some(existing) = artifact.method(&setter.name) {
                if existing.descriptor != setter.descriptor {
                    return Err(WeaveError::AccessorConflict {
                        accessor: setter.name,
                        expected: setter.descriptor,
                        actual: existing.descriptor.clone(),
                    });
                }
                debug!("访问器已存在，跳过: {}.{}", artifact.type_name, setter.name);
                continue;
            }

            let field = &mut artifact.fields[index];
            if field.modifiers.is_immutable {
                debug!("去掉字段的不可变标记: {}.{}", artifact.type_name, field.name);
                field.modifiers.is_immutable = false;
            }
            added.push(if setter.access.is_static {
                format!("{} (static)", setter.name)
            } else {
                setter.name.clone()
            });
            artifact.methods.push(setter);
        }

        if !added.is_empty() {
            info!("织入 {} 个访问器: {}", added.len(), artifact.type_name);
        }
        Ok(added)
    }

    /// 织入序列化的构件
    pub fn weave_bytes(&self, bytes: &[u8]) -> WeavingResult {
        let mut artifact = match ComponentArtifact::from_bytes(bytes) {
            Ok(artifact) => artifact,
            Err(e) => {
                return WeavingResult::Error {
                    type_name: String::new(),
                    message: e.to_string(),
                }
            }
        };
        let type_name = artifact.type_name.clone();

        let added = match self.weave(&mut artifact) {
            Ok(added) => added,
            Err(e) => {
                return WeavingResult::Error {
                    type_name,
                    message: e.to_string(),
                }
            }
        };
        if added.is_empty() {
            return WeavingResult::Unchanged { type_name };
        }
        match artifact.to_bytes() {
            Ok(bytes) => WeavingResult::Modified {
                type_name,
                bytes,
                added,
            },
            Err(e) => WeavingResult::Error {
                type_name,
                message: e.to_string(),
            },
        }
    }

    /// 织入单个构件文件，只在修改时写回
    pub fn weave_file(&self, path: &Path) -> WeavingResult {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                return WeavingResult::Error {
                    type_name: String::new(),
                    message: WeaveError::io(path, e).to_string(),
                }
            }
        };
        let result = self.weave_bytes(&bytes);
        if let Some(woven) = result.bytes() {
            if let Err(e) = std::fs::write(path, woven) {
                return WeavingResult::Error {
                    type_name: result.type_name().to_string(),
                    message: WeaveError::io(path, e).to_string(),
                };
            }
        }
        result
    }

    /// 织入目录下的全部 `*.artifact.json` 文件
    ///
    /// 目录不存在时返回空结果；单个文件的失败记录在对应结果中。
    pub fn weave_directory(&self, dir: &Path) -> WeaveResult<Vec<(PathBuf, WeavingResult)>> {
        if !dir.is_dir() {
            warn!("构件目录不存在: {}", dir.display());
            return Ok(Vec::new());
        }

        let pattern = dir.join("**").join(format!("*.{ARTIFACT_EXTENSION}"));
        let pattern = pattern.to_string_lossy().into_owned();
        let entries = glob::glob(&pattern).map_err(|e| WeaveError::InvalidPattern {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;

        let mut results = Vec::new();
        for entry in entries {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    let path = e.path().to_path_buf();
                    let message = WeaveError::io(&path, e.into_error()).to_string();
                    results.push((
                        path,
                        WeavingResult::Error {
                            type_name: String::new(),
                            message,
                        },
                    ));
                    continue;
                }
            };
            let result = self.weave_file(&path);
            debug!("{}: {}", path.display(), result);
            results.push((path, result));
        }

        let modified = results.iter().filter(|(_, r)| r.was_modified()).count();
        let failed = results.iter().filter(|(_, r)| r.has_error()).count();
        info!(
            "目录织入完成: {} 个构件，修改 {} 个，失败 {} 个",
            results.len(),
            modified,
            failed
        );
        Ok(results)
    }
}

/// 构造字段访问器
///
/// 实例访问器：装载 this，装载参数，写字段，返回。
/// 静态访问器：装载参数，写静态字段，返回。64 位值占两个槽。
fn setter(owner: &str, field: &FieldEntry) -> MethodEntry {
    let descriptor = field.field_type.descriptor();
    let slots = field.field_type.slot_size();
    let load = field.field_type.load_opcode();
    let is_static = field.modifiers.is_static;

    let instructions = if is_static {
        vec![
            Instruction::Load {
                opcode: load,
                slot: 0,
            },
            Instruction::PutStatic {
                owner: owner.to_string(),
                name: field.name.clone(),
                descriptor: descriptor.clone(),
            },
            Instruction::Return,
        ]
    } else {
        vec![
            Instruction::Load {
                opcode: LoadOpcode::Aload,
                slot: 0,
            },
            Instruction::Load {
                opcode: load,
                slot: 1,
            },
            Instruction::PutField {
                owner: owner.to_string(),
                name: field.name.clone(),
                descriptor: descriptor.clone(),
            },
            Instruction::Return,
        ]
    };

    let receiver = u16::from(!is_static);
    MethodEntry {
        name: accessor_name(&field.name),
        descriptor: format!("({descriptor})V"),
        access: MethodAccess {
            is_public: true,
            is_static,
            is_synthetic: true,
        },
        max_stack: slots + receiver,
        max_locals: slots + receiver,
        instructions,
    }
}
