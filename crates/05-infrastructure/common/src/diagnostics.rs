//! 诊断信息
//!
//! 构建过程中产生的错误、警告与提示统一收集在 [`Diagnostics`] 中，
//! 同时同步输出到 tracing。严格模式下警告升级为错误。

use crate::metadata::TypeName;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, error, info, warn};

/// 严重级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// 错误，终止构建
    Error,
    /// 警告
    Warning,
    /// 提示
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
            Self::Note => f.write_str("note"),
        }
    }
}

/// 单条诊断
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// 严重级别
    pub severity: Severity,
    /// 消息
    pub message: String,
    /// 关联组件
    pub component: Option<TypeName>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.component {
            Some(component) => write!(f, "{}: [{}] {}", self.severity, component, self.message),
            None => write!(f, "{}: {}", self.severity, self.message),
        }
    }
}

/// 诊断收集器
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    strict: bool,
    debug: bool,
}

impl Diagnostics {
    /// 创建收集器
    pub fn new() -> Self {
        Self::default()
    }

    /// 严格模式：警告升级为错误
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// 调试模式：记录额外提示
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// 是否为严格模式
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// 记录错误
    pub fn error(&mut self, message: impl Into<String>, component: Option<&TypeName>) {
        let message = message.into();
        error!(component = ?component.map(TypeName::as_str), "{}", message);
        self.push(Severity::Error, message, component);
    }

    /// 记录警告，严格模式下记为错误
    pub fn warning(&mut self, message: impl Into<String>, component: Option<&TypeName>) {
        let message = message.into();
        if self.strict {
            let message = format!("[strict] {message}");
            error!(component = ?component.map(TypeName::as_str), "{}", message);
            self.push(Severity::Error, message, component);
        } else {
            warn!(component = ?component.map(TypeName::as_str), "{}", message);
            self.push(Severity::Warning, message, component);
        }
    }

    /// 记录提示
    pub fn note(&mut self, message: impl Into<String>, component: Option<&TypeName>) {
        let message = message.into();
        info!(component = ?component.map(TypeName::as_str), "{}", message);
        self.push(Severity::Note, message, component);
    }

    /// 仅在调试模式下记录的提示
    pub fn debug_note(&mut self, message: impl Into<String>, component: Option<&TypeName>) {
        if !self.debug {
            return;
        }
        let message = message.into();
        debug!(component = ?component.map(TypeName::as_str), "{}", message);
        self.push(Severity::Note, message, component);
    }

    fn push(&mut self, severity: Severity, message: String, component: Option<&TypeName>) {
        self.entries.push(Diagnostic {
            severity,
            message,
            component: component.cloned(),
        });
    }

    /// 是否存在错误
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// 错误数量
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    /// 警告数量
    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.severity == severity)
            .count()
    }

    /// 指定级别的诊断
    pub fn of(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> + '_ {
        self.entries
            .iter()
            .filter(move |entry| entry.severity == severity)
    }

    /// 全部诊断
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> + '_ {
        self.entries.iter()
    }

    /// 诊断数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 转为列表
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
