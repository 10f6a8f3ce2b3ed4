//! 直接生成策略
//!
//! 每个组件生成一个零参数访问器：
//!
//! - 可用持有者方式的单例：`Lazy<Arc<T>>` 静态量，访问器直接克隆引用；
//! - 惰性或带注入的单例：`SingletonCell` 双重检查加锁；
//! - 原型：每次调用重新构造并重新注入。
//!
//! 非惰性单例在 `initialize()` 中按拓扑序创建，另附平铺数组查找表 `LOOKUP`。

use crate::expressions::{type_path, DependencySource};
use crate::naming::{assign_names, ComponentNames};
use crate::render::render;
use crate::routines::{construction, hook_call};
use di_abstractions::{EmissionStrategy, GeneratedArtifacts, GeneratedFile, GraphCompiler, ResolvedGraph};
use di_impl::select_implementation;
use infrastructure_common::{CompileError, Diagnostics, Scope};
use proc_macro2::TokenStream;
use quote::quote;
use std::collections::{BTreeSet, VecDeque};
use tracing::{debug, info};

/// 默认输出文件名
pub const DEFAULT_CONTAINER_FILE: &str = "di_container.rs";

/// 直接生成策略的图编译器
#[derive(Debug, Clone)]
pub struct DirectCompiler {
    file_name: String,
}

impl DirectCompiler {
    /// 创建编译器
    pub fn new() -> Self {
        Self {
            file_name: DEFAULT_CONTAINER_FILE.to_string(),
        }
    }

    /// 设置输出文件名
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// 生成源代码
    pub fn generate(&self, graph: &ResolvedGraph) -> Result<String, CompileError> {
        let names = assign_names(graph.components());
        let promoted = promoted_lazy_singletons(graph);
        let source = Accessors { names: &names };

        let mut items = Vec::with_capacity(graph.len());
        for (index, _) in graph.components().iter().enumerate() {
            items.push(accessor_items(graph, index, &names[index], &source)?);
        }

        // 静态初始化按拓扑序创建非惰性单例和被提升的惰性单例
        let eager: Vec<_> = graph
            .construction_order()
            .filter(|(index, component)| {
                component.scope == Scope::Singleton && (!component.lazy || promoted.contains(index))
            })
            .map(|(index, _)| names[index].accessor())
            .collect();

        let mut destroy = Vec::new();
        for &index in graph.order().iter().rev() {
            let component = graph.component(index);
            if component.scope != Scope::Singleton {
                continue;
            }
            let cell = names[index].cell();
            let receiver = quote! { instance };
            if let Some(call) = hook_call(component.hooks.pre_destroy.as_ref(), &receiver) {
                destroy.push(quote! {
                    if let ::std::option::Option::Some(instance) = #cell.get() {
                        #call
                    }
                });
            }
        }

        let lookup = flat_lookup(graph, &names);

        render(quote! {
            #(#items)*

            static STATIC_INIT: ::di_impl::once_cell::sync::Lazy<()> =
                ::di_impl::once_cell::sync::Lazy::new(|| {
                    #(let _ = #eager();)*
                });

            /// 按依赖顺序创建全部非惰性单例，重复调用无副作用
            pub fn initialize() {
                ::di_impl::once_cell::sync::Lazy::force(&STATIC_INIT);
            }

            /// 按创建的逆序调用已创建单例的销毁钩子
            pub fn shutdown() {
                #(#destroy)*
            }

            #lookup
        })
    }
}

impl Default for DirectCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphCompiler for DirectCompiler {
    fn strategy(&self) -> EmissionStrategy {
        EmissionStrategy::Direct
    }

    fn compile(
        &self,
        graph: &ResolvedGraph,
        diagnostics: &mut Diagnostics,
    ) -> Result<GeneratedArtifacts, CompileError> {
        info!("开始生成静态容器: {} 个组件", graph.len());
        for index in promoted_lazy_singletons(graph) {
            let component = graph.component(index);
            diagnostics.note(
                format!("惰性单例 {} 被非惰性单例依赖，将在静态初始化时创建", component.type_name),
                Some(&component.type_name),
            );
        }
        let holders = graph
            .components()
            .iter()
            .filter(|component| component.is_holder_eligible())
            .count();
        let source = self.generate(graph)?;
        diagnostics.note(
            format!(
                "已生成 {} 个访问器（其中 {} 个持有者）: {}",
                graph.len(),
                holders,
                self.file_name
            ),
            None,
        );
        Ok(GeneratedArtifacts::new(EmissionStrategy::Direct)
            .with_file(GeneratedFile::new(&self.file_name, source)))
    }
}

/// 被非惰性单例经硬依赖（可经过原型）传递依赖的惰性单例
pub fn promoted_lazy_singletons(graph: &ResolvedGraph) -> BTreeSet<usize> {
    let mut visited = vec![false; graph.len()];
    let mut queue: VecDeque<usize> = graph
        .components()
        .iter()
        .enumerate()
        .filter(|(_, component)| component.scope == Scope::Singleton && !component.lazy)
        .map(|(index, _)| index)
        .collect();
    let mut promoted = BTreeSet::new();

    while let Some(index) = queue.pop_front() {
        for &dependency in graph.hard_dependencies(index) {
            if visited[dependency] {
                continue;
            }
            visited[dependency] = true;
            let component = graph.component(dependency);
            if component.scope == Scope::Singleton && component.lazy {
                debug!("提升惰性单例: {}", component.type_name);
                promoted.insert(dependency);
            }
            queue.push_back(dependency);
        }
    }
    promoted
}

/// 直接调用目标组件的访问器
struct Accessors<'a> {
    names: &'a [ComponentNames],
}

impl DependencySource for Accessors<'_> {
    fn instance(&self, _graph: &ResolvedGraph, target: usize) -> Result<TokenStream, CompileError> {
        let accessor = self.names[target].accessor();
        Ok(quote! { #accessor() })
    }

    fn supplier(
        &self,
        _graph: &ResolvedGraph,
        target: usize,
        view: Option<TokenStream>,
    ) -> Result<TokenStream, CompileError> {
        let accessor = self.names[target].accessor();
        Ok(match view {
            Some(view) => quote! { || -> #view { #accessor() } },
            None => quote! { #accessor },
        })
    }
}

fn accessor_items(
    graph: &ResolvedGraph,
    index: usize,
    names: &ComponentNames,
    source: &Accessors<'_>,
) -> Result<TokenStream, CompileError> {
    let component = graph.component(index);
    let path = type_path(&component.type_name)?;
    let accessor = names.accessor();
    let create = names.create();
    let cell = names.cell();
    let body = construction(graph, index, source)?;

    if component.is_holder_eligible() {
        let doc = format!(" `{}` 单例，静态初始化后无锁读取", component.type_name);
        debug!("持有者访问器: {}", accessor);
        return Ok(quote! {
            static #cell: ::di_impl::once_cell::sync::Lazy<::std::sync::Arc<#path>> =
                ::di_impl::once_cell::sync::Lazy::new(|| ::std::sync::Arc::new(#body));

            #[doc = #doc]
            pub fn #accessor() -> ::std::sync::Arc<#path> {
                ::std::sync::Arc::clone(&#cell)
            }
        });
    }

    let receiver = quote! { instance };
    let post_create = hook_call(component.hooks.post_create.as_ref(), &receiver);
    let create_fn = quote! {
        fn #create() -> ::std::sync::Arc<#path> {
            let instance = ::std::sync::Arc::new(#body);
            #post_create
            instance
        }
    };

    match component.scope {
        Scope::Singleton => {
            let doc = format!(" `{}` 单例，首次访问时加锁创建", component.type_name);
            debug!("单例访问器: {}", accessor);
            Ok(quote! {
                static #cell: ::di_impl::SingletonCell<::std::sync::Arc<#path>> =
                    ::di_impl::SingletonCell::new();

                #create_fn

                #[doc = #doc]
                pub fn #accessor() -> ::std::sync::Arc<#path> {
                    #cell.get_or_init(#create)
                }
            })
        }
        Scope::Prototype => {
            let doc = format!(" `{}` 原型，每次调用创建新实例", component.type_name);
            debug!("原型访问器: {}", accessor);
            Ok(quote! {
                #create_fn

                #[doc = #doc]
                pub fn #accessor() -> ::std::sync::Arc<#path> {
                    #create()
                }
            })
        }
    }
}

/// 平铺数组：类型、名称、作用域编码、访问器，以及能力类型到所选实现的映射
fn flat_lookup(graph: &ResolvedGraph, names: &[ComponentNames]) -> TokenStream {
    let count = graph.len();
    let types = graph.components().iter().map(|c| c.type_name.as_str());
    let component_names = graph.components().iter().map(|c| c.name.as_str());
    let scopes = graph.components().iter().map(|c| c.scope.kind_index());

    let slot_names: Vec<_> = names.iter().map(ComponentNames::slot).collect();
    let slot_fns = names.iter().zip(&slot_names).map(|(n, slot)| {
        let accessor = n.accessor();
        quote! {
            fn #slot() -> ::di_abstractions::Instance {
                #accessor()
            }
        }
    });

    let capabilities: Vec<TokenStream> = graph
        .capability_index()
        .iter()
        .filter_map(|(capability, candidates)| {
            let chosen = select_implementation(graph.components(), candidates)?;
            let key = capability.as_str();
            Some(quote! { (#key, #chosen) })
        })
        .collect();
    let capability_count = capabilities.len();

    quote! {
        #(#slot_fns)*

        static TYPES: [&str; #count] = [#(#types),*];
        static NAMES: [&str; #count] = [#(#component_names),*];
        static SCOPES: [u8; #count] = [#(#scopes),*];
        static SLOTS: [::di_impl::Supplier; #count] = [#(#slot_names),*];
        static CAPABILITIES: [(&str, usize); #capability_count] = [#(#capabilities),*];

        /// 按类型、名称、能力类型查找组件
        pub static LOOKUP: ::di_impl::once_cell::sync::Lazy<::di_impl::FlatRegistry> =
            ::di_impl::once_cell::sync::Lazy::new(|| {
                ::di_impl::FlatRegistry::new(&TYPES, &NAMES, &SCOPES, &SLOTS)
                    .with_capabilities(&CAPABILITIES)
            });
    }
}
