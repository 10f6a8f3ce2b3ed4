//! 元数据定义
//!
//! 提供组件、注入点与依赖的元数据模型。
//! 元数据由外部提取阶段一次性填充，进入依赖图构建后视为只读；
//! 此处不做任何语义校验，校验统一放在验证流水线中。

use crate::condition::Condition;
use crate::configuration::PrimitiveType;
use crate::lifecycle::{LifecycleHooks, Scope};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// 字段访问器名称前缀
pub const ACCESSOR_PREFIX: &str = "__di_set_";

/// 根据字段名推导访问器名称
///
/// 织入器与代码生成器共享该规则，生成器无需再次检查构件即可预测访问器名称。
pub fn accessor_name(field: &str) -> String {
    format!("{ACCESSOR_PREFIX}{field}")
}

/// 获取简单名称（去掉模块路径）
pub fn simple_name(name: &str) -> &str {
    let tail = name.rsplit("::").next().unwrap_or(name);
    tail.rsplit('.').next().unwrap_or(tail)
}

/// 首字母小写，用于推导默认组件名称
pub fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// 完全限定类型名称
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeName(String);

impl TypeName {
    /// 创建类型名称
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// 完整路径
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 获取简短的类型名称（不包含模块路径）
    pub fn simple_name(&self) -> &str {
        simple_name(&self.0)
    }

    /// 模块路径，顶层类型返回空串
    pub fn module_path(&self) -> &str {
        self.0
            .rfind("::")
            .map_or("", |index| &self.0[..index])
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TypeName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for TypeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TypeName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// 依赖解析方式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DependencyKind {
    /// 直接依赖，参与依赖图
    Direct,
    /// 延迟调用包装，每次调用时解析
    Provider,
    /// 惰性引用，首次使用时解析并缓存
    Lazy,
    /// 可选依赖，目标缺失时不影响创建
    Optional,
    /// 配置值，由配置解析器求值后转换为目标类型
    Value {
        /// 字面表达式，允许 `${key:default}` 占位符
        expression: String,
        /// 目标基础类型
        target: PrimitiveType,
    },
}

impl DependencyKind {
    /// 是否为硬依赖（参与环检测和拓扑排序）
    pub fn is_hard(&self) -> bool {
        matches!(self, Self::Direct)
    }

    /// 简短描述
    pub fn label(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Provider => "provider",
            Self::Lazy => "lazy",
            Self::Optional => "optional",
            Self::Value { .. } => "value",
        }
    }
}

/// 依赖
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// 声明类型
    pub type_name: TypeName,
    /// 解析方式
    #[serde(flatten)]
    pub kind: DependencyKind,
    /// 限定符（按名称匹配）
    #[serde(default)]
    pub qualifier: Option<String>,
    /// 包装类依赖实际注册的类型
    #[serde(default)]
    pub actual_type: Option<TypeName>,
}

impl Dependency {
    fn with_kind(type_name: impl Into<TypeName>, kind: DependencyKind) -> Self {
        Self {
            type_name: type_name.into(),
            kind,
            qualifier: None,
            actual_type: None,
        }
    }

    /// 直接依赖
    pub fn direct(type_name: impl Into<TypeName>) -> Self {
        Self::with_kind(type_name, DependencyKind::Direct)
    }

    /// 延迟调用依赖
    pub fn provider(type_name: impl Into<TypeName>) -> Self {
        Self::with_kind(type_name, DependencyKind::Provider)
    }

    /// 惰性依赖
    pub fn lazy(type_name: impl Into<TypeName>) -> Self {
        Self::with_kind(type_name, DependencyKind::Lazy)
    }

    /// 可选依赖
    pub fn optional(type_name: impl Into<TypeName>) -> Self {
        Self::with_kind(type_name, DependencyKind::Optional)
    }

    /// 配置值依赖
    pub fn value(expression: impl Into<String>, target: PrimitiveType) -> Self {
        Self::with_kind(
            target.rust_name(),
            DependencyKind::Value {
                expression: expression.into(),
                target,
            },
        )
    }

    /// 设置限定符
    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    /// 设置实际注册类型
    pub fn with_actual_type(mut self, actual_type: impl Into<TypeName>) -> Self {
        self.actual_type = Some(actual_type.into());
        self
    }

    /// 解析时使用的类型
    pub fn lookup_type(&self) -> &TypeName {
        self.actual_type.as_ref().unwrap_or(&self.type_name)
    }

    /// 是否为硬依赖
    pub fn is_hard(&self) -> bool {
        self.kind.is_hard()
    }

    /// 是否允许目标缺失
    pub fn allows_missing(&self) -> bool {
        matches!(self.kind, DependencyKind::Optional)
    }
}

/// 注入点类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjectionKind {
    /// 构造注入
    Constructor,
    /// 字段注入
    Field,
    /// 方法注入
    Method,
}

impl fmt::Display for InjectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constructor => f.write_str("constructor"),
            Self::Field => f.write_str("field"),
            Self::Method => f.write_str("method"),
        }
    }
}

/// 目标可见性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// 公开，可直接赋值
    Public,
    /// crate 内可见
    Crate,
    /// 私有
    #[default]
    Private,
}

impl Visibility {
    /// 是否允许外部直接赋值
    pub fn is_public(self) -> bool {
        matches!(self, Self::Public)
    }
}

/// 成员修饰符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    /// 静态成员
    pub is_static: bool,
    /// 抽象成员
    pub is_abstract: bool,
    /// 不可变字段
    pub is_immutable: bool,
}

/// 注入点
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectionPoint {
    /// 注入点类型
    pub kind: InjectionKind,
    /// 目标名称（构造函数、字段或方法名）
    pub target: String,
    /// 有序依赖列表
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    /// 目标可见性，仅对字段有意义
    #[serde(default)]
    pub visibility: Visibility,
    /// 修饰符
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl InjectionPoint {
    fn with_kind(kind: InjectionKind, target: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
            dependencies: Vec::new(),
            visibility: Visibility::Public,
            modifiers: Modifiers::default(),
        }
    }

    /// 构造注入点
    pub fn constructor(target: impl Into<String>) -> Self {
        Self::with_kind(InjectionKind::Constructor, target)
    }

    /// 字段注入点，默认私有
    pub fn field(target: impl Into<String>, dependency: Dependency) -> Self {
        let mut point = Self::with_kind(InjectionKind::Field, target);
        point.visibility = Visibility::Private;
        point.dependencies.push(dependency);
        point
    }

    /// 方法注入点
    pub fn method(target: impl Into<String>) -> Self {
        Self::with_kind(InjectionKind::Method, target)
    }

    /// 追加依赖
    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// 设置可见性
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// 标记为不可变字段
    pub fn immutable(mut self) -> Self {
        self.modifiers.is_immutable = true;
        self
    }

    /// 标记为静态成员
    pub fn static_member(mut self) -> Self {
        self.modifiers.is_static = true;
        self
    }

    /// 标记为抽象成员
    pub fn abstract_member(mut self) -> Self {
        self.modifiers.is_abstract = true;
        self
    }

    /// 字段注入是否需要经由织入的访问器
    pub fn requires_accessor(&self) -> bool {
        self.kind == InjectionKind::Field && !self.visibility.is_public()
    }

    /// 访问器名称
    pub fn accessor_name(&self) -> Option<String> {
        self.requires_accessor().then(|| accessor_name(&self.target))
    }
}

/// 组件元数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentMetadata {
    /// 组件类型（身份）
    pub type_name: TypeName,
    /// 组件名称，用于按名称查找；清单中省略时由读取方补全
    #[serde(default)]
    pub name: String,
    /// 显式限定符
    #[serde(default)]
    pub qualifier: Option<String>,
    /// 作用域
    #[serde(default)]
    pub scope: Scope,
    /// 是否惰性创建
    #[serde(default)]
    pub lazy: bool,
    /// 是否为首选实现
    #[serde(default)]
    pub primary: bool,
    /// 实现的能力类型，按声明顺序
    #[serde(default)]
    pub capabilities: Vec<TypeName>,
    /// 生命周期钩子
    #[serde(default)]
    pub hooks: LifecycleHooks,
    /// 条件注册谓词
    #[serde(default)]
    pub condition: Option<Condition>,
    /// 显式的创建顺序依赖（按组件名称）
    #[serde(default)]
    pub depends_on: Vec<String>,
    /// 注入点
    #[serde(default)]
    pub injection_points: Vec<InjectionPoint>,
}

impl ComponentMetadata {
    /// 创建新的组件元数据，名称默认为首字母小写的简单类型名
    pub fn new(type_name: impl Into<TypeName>) -> Self {
        let type_name = type_name.into();
        let name = decapitalize(type_name.simple_name());
        Self {
            type_name,
            name,
            qualifier: None,
            scope: Scope::Singleton,
            lazy: false,
            primary: false,
            capabilities: Vec::new(),
            hooks: LifecycleHooks::default(),
            condition: None,
            depends_on: Vec::new(),
            injection_points: Vec::new(),
        }
    }

    /// 设置组件名称
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// 设置限定符
    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    /// 设置作用域
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// 原型作用域
    pub fn prototype(self) -> Self {
        self.with_scope(Scope::Prototype)
    }

    /// 惰性创建
    pub fn lazy(mut self) -> Self {
        self.lazy = true;
        self
    }

    /// 首选实现
    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    /// 添加能力类型
    pub fn with_capability(mut self, capability: impl Into<TypeName>) -> Self {
        self.capabilities.push(capability.into());
        self
    }

    /// 设置创建后钩子
    pub fn with_post_create(mut self, method: impl Into<String>) -> Self {
        self.hooks.post_create = Some(method.into());
        self
    }

    /// 设置销毁前钩子
    pub fn with_pre_destroy(mut self, method: impl Into<String>) -> Self {
        self.hooks.pre_destroy = Some(method.into());
        self
    }

    /// 设置条件
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// 添加显式顺序依赖
    pub fn with_depends_on(mut self, name: impl Into<String>) -> Self {
        self.depends_on.push(name.into());
        self
    }

    /// 添加注入点
    pub fn with_injection_point(mut self, point: InjectionPoint) -> Self {
        self.injection_points.push(point);
        self
    }

    /// 简单类型名
    pub fn simple_name(&self) -> &str {
        self.type_name.simple_name()
    }

    /// 构造注入点（取第一个）
    pub fn constructor(&self) -> Option<&InjectionPoint> {
        self.points_of(InjectionKind::Constructor).next()
    }

    /// 指定类型的注入点
    pub fn points_of(&self, kind: InjectionKind) -> impl Iterator<Item = &InjectionPoint> + '_ {
        self.injection_points
            .iter()
            .filter(move |point| point.kind == kind)
    }

    /// 是否存在需要注入的成员
    ///
    /// 无参数的构造注入点不算注入。
    pub fn is_injected(&self) -> bool {
        self.injection_points.iter().any(|point| {
            point.kind != InjectionKind::Constructor || !point.dependencies.is_empty()
        })
    }

    /// 是否满足给定类型（自身类型或能力类型）
    pub fn satisfies(&self, type_name: &TypeName) -> bool {
        &self.type_name == type_name || self.capabilities.contains(type_name)
    }

    /// 是否可以使用持有者方式生成
    ///
    /// 非惰性单例，且没有注入成员和生命周期钩子。
    pub fn is_holder_eligible(&self) -> bool {
        self.scope == Scope::Singleton && !self.lazy && !self.is_injected() && self.hooks.is_empty()
    }

    /// 遍历全部依赖，返回 (注入点序号, 依赖序号, 依赖)
    pub fn dependencies(&self) -> impl Iterator<Item = (usize, usize, &Dependency)> + '_ {
        self.injection_points
            .iter()
            .enumerate()
            .flat_map(|(point_index, point)| {
                point
                    .dependencies
                    .iter()
                    .enumerate()
                    .map(move |(dep_index, dep)| (point_index, dep_index, dep))
            })
    }
}
