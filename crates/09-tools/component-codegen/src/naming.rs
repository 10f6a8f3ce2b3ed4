//! 生成代码的命名规则
//!
//! 访问器、工厂、静态单元的名称都由组件的简单类型名推出，
//! 简单名重复时追加组件序号。派生出的任一名称与生成代码的固定条目或
//! 其他组件的名称重复时，再追加序号直到不冲突。

use infrastructure_common::ComponentMetadata;
use proc_macro2::{Ident, Span};
use std::collections::{HashMap, HashSet};

/// 生成代码中固定出现的条目和局部变量名
pub const RESERVED_NAMES: &[&str] = &[
    "initialize",
    "shutdown",
    "LOOKUP",
    "TYPES",
    "NAMES",
    "SCOPES",
    "SLOTS",
    "CAPABILITIES",
    "STATIC_INIT",
    "register_components",
    "build_registry",
    "application_context",
    "instance",
];

/// `OrderService` → `order_service`，`HTTPClient` → `http_client`
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(char::is_lowercase),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else if c.is_alphanumeric() {
            out.push(c);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out
}

/// 转换为合法标识符，关键字加下划线后缀
pub fn ident(name: &str) -> Ident {
    let name = if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{name}")
    } else {
        name.to_string()
    };
    match syn::parse_str::<Ident>(&name) {
        Ok(ident) => ident,
        Err(_) => Ident::new(&format!("{name}_"), Span::call_site()),
    }
}

/// 每个组件的生成名称
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentNames {
    /// 访问器函数名，例如 `order_service`
    pub accessor: String,
}

impl ComponentNames {
    /// 访问器标识符
    pub fn accessor(&self) -> Ident {
        ident(&self.accessor)
    }

    /// 创建例程标识符，例如 `create_order_service`
    pub fn create(&self) -> Ident {
        ident(&format!("create_{}", self.accessor))
    }

    /// 静态单元标识符，例如 `ORDER_SERVICE`
    pub fn cell(&self) -> Ident {
        ident(&self.accessor.to_uppercase())
    }

    /// 平铺数组中的访问器包装函数标识符，例如 `order_service_slot`
    pub fn slot(&self) -> Ident {
        ident(&format!("{}_slot", self.accessor))
    }

    /// 工厂类型标识符，例如 `OrderServiceFactory`
    pub fn factory(&self) -> Ident {
        ident(&format!("{}Factory", pascal_case(&self.accessor)))
    }

    /// 能力类型转换函数标识符
    pub fn caster(&self, capability: &str) -> Ident {
        ident(&format!(
            "{}_as_{}",
            self.accessor,
            snake_case(infrastructure_common::simple_name(capability))
        ))
    }

    /// 该组件在生成代码中占用的全部标识符
    fn identifiers(&self, component: &ComponentMetadata) -> Vec<String> {
        let mut identifiers = vec![
            self.accessor().to_string(),
            self.create().to_string(),
            self.cell().to_string(),
            self.slot().to_string(),
            self.factory().to_string(),
        ];
        identifiers.extend(
            component
                .capabilities
                .iter()
                .map(|capability| self.caster(capability.as_str()).to_string()),
        );
        identifiers
    }
}

/// 为全部组件分配不冲突的名称
pub fn assign_names(components: &[ComponentMetadata]) -> Vec<ComponentNames> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for component in components {
        *counts.entry(snake_case(component.simple_name())).or_default() += 1;
    }
    let mut taken: HashSet<String> = RESERVED_NAMES.iter().map(ToString::to_string).collect();
    components
        .iter()
        .enumerate()
        .map(|(index, component)| {
            let snake = snake_case(component.simple_name());
            let base = if counts.get(&snake).copied().unwrap_or(0) > 1 {
                format!("{snake}_{index}")
            } else {
                snake
            };

            let mut names = ComponentNames { accessor: base.clone() };
            let mut attempt = 0;
            loop {
                let identifiers = names.identifiers(component);
                if identifiers.iter().all(|name| !taken.contains(name)) {
                    taken.extend(identifiers);
                    break;
                }
                attempt += 1;
                names = ComponentNames {
                    accessor: format!("{base}_{attempt}"),
                };
            }
            names
        })
        .collect()
}

fn pascal_case(snake: &str) -> String {
    snake
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
