//! 间接生成策略
//!
//! 每个组件生成一个 `ComponentFactory` 实现（创建例程加生命周期钩子例程），
//! 再生成把全部工厂注册进 `ComponentRegistryImpl` 的入口函数。
//! 创建例程通过注册表按具体类型递归取得依赖。

use crate::expressions::{capability_view, type_path, DependencySource};
use crate::naming::{assign_names, ComponentNames};
use crate::render::render;
use crate::routines::{construction, hook_call};
use di_abstractions::{
    Binding, DependencySite, EmissionStrategy, GeneratedArtifacts, GeneratedFile, GraphCompiler, ResolvedGraph,
};
use infrastructure_common::{CompileError, ComponentMetadata, Diagnostics, Scope};
use proc_macro2::TokenStream;
use quote::quote;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// 默认输出文件名
pub const DEFAULT_REGISTRY_FILE: &str = "di_registry.rs";

/// 间接生成策略的图编译器
#[derive(Debug, Clone)]
pub struct RegistryCompiler {
    file_name: String,
}

impl RegistryCompiler {
    /// 创建编译器
    pub fn new() -> Self {
        Self {
            file_name: DEFAULT_REGISTRY_FILE.to_string(),
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
        let mut factories = Vec::with_capacity(graph.len());
        let mut registrations = Vec::with_capacity(graph.len());
        let mut casters = Vec::new();

        for (index, component) in graph.components().iter().enumerate() {
            factories.push(factory(graph, index, &names)?);
            let (registration, component_casters) = registration(component, &names[index])?;
            registrations.push(registration);
            casters.extend(component_casters);
        }

        render(quote! {
            #(#factories)*

            #(#casters)*

            /// 把全部组件按注册顺序加入构建器
            pub fn register_components(builder: &mut ::di_impl::RegistryBuilder) {
                #(#registrations)*
            }

            /// 构建组件注册表
            pub fn build_registry() -> ::infrastructure_common::DependencyResult<
                ::std::sync::Arc<::di_impl::ComponentRegistryImpl>,
            > {
                let mut builder = ::di_impl::ComponentRegistryImpl::builder();
                register_components(&mut builder);
                builder.build()
            }

            /// 创建应用上下文，调用 `start` 后创建全部非惰性单例
            pub fn application_context(
            ) -> ::infrastructure_common::DependencyResult<::di_impl::ApplicationContextImpl> {
                build_registry().map(::di_impl::ApplicationContextImpl::new)
            }
        })
    }
}

impl Default for RegistryCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphCompiler for RegistryCompiler {
    fn strategy(&self) -> EmissionStrategy {
        EmissionStrategy::Indirect
    }

    fn compile(
        &self,
        graph: &ResolvedGraph,
        diagnostics: &mut Diagnostics,
    ) -> Result<GeneratedArtifacts, CompileError> {
        info!("开始生成组件注册表: {} 个组件", graph.len());
        let source = self.generate(graph)?;
        diagnostics.note(
            format!("已生成 {} 个组件工厂: {}", graph.len(), self.file_name),
            None,
        );
        Ok(GeneratedArtifacts::new(EmissionStrategy::Indirect)
            .with_file(GeneratedFile::new(&self.file_name, source)))
    }
}

/// 通过注册表取得依赖
struct RegistryLookup;

impl DependencySource for RegistryLookup {
    fn instance(&self, graph: &ResolvedGraph, target: usize) -> Result<TokenStream, CompileError> {
        let type_name = &graph.component(target).type_name;
        let path = type_path(type_name)?;
        let key = type_name.as_str();
        Ok(quote! { lookup.require::<#path>(#key) })
    }

    fn supplier(
        &self,
        graph: &ResolvedGraph,
        target: usize,
        view: Option<TokenStream>,
    ) -> Result<TokenStream, CompileError> {
        let instance = self.instance(graph, target)?;
        let closure = match view {
            Some(view) => quote! { move || -> #view { #instance } },
            None => quote! { move || #instance },
        };
        // 包装类型只持有注册表的弱引用，避免单例与注册表互相持有
        Ok(quote! {
            {
                let lookup = ::di_abstractions::WeakLookup::new(lookup);
                #closure
            }
        })
    }
}

fn factory(
    graph: &ResolvedGraph,
    index: usize,
    names: &[ComponentNames],
) -> Result<TokenStream, CompileError> {
    let component = graph.component(index);
    let path = type_path(&component.type_name)?;
    let factory = names[index].factory();
    let type_key = component.type_name.as_str();
    let doc = format!(" `{}` 的工厂", component.type_name);

    let targets: BTreeSet<&str> = component
        .dependencies()
        .filter_map(|(point, dep, _)| match graph.binding(DependencySite::new(index, point, dep)) {
            Some(Binding::Component(target)) => Some(graph.component(*target).type_name.as_str()),
            _ => None,
        })
        .collect();
    let uses_lookup = !targets.is_empty();
    let dependencies = targets.iter();

    let body = construction(graph, index, &RegistryLookup)?;
    let (lookup_param, lookup_import) = if uses_lookup {
        (quote! { lookup }, quote! { use ::di_abstractions::ComponentLookupExt as _; })
    } else {
        (quote! { _lookup }, TokenStream::new())
    };

    let component_ref = quote! { component };
    let post_create = hook_call(component.hooks.post_create.as_ref(), &component_ref).map(|call| {
        quote! {
            fn post_create(&self, instance: &::di_abstractions::Instance) {
                if let ::std::option::Option::Some(component) = instance.downcast_ref::<#path>() {
                    #call
                }
            }
        }
    });
    let pre_destroy = hook_call(component.hooks.pre_destroy.as_ref(), &component_ref).map(|call| {
        quote! {
            fn pre_destroy(&self, instance: &::di_abstractions::Instance) {
                if let ::std::option::Option::Some(component) = instance.downcast_ref::<#path>() {
                    #call
                }
            }
        }
    });

    debug!("生成工厂: {}", factory);
    Ok(quote! {
        #[doc = #doc]
        pub struct #factory;

        impl ::di_abstractions::ComponentFactory for #factory {
            fn type_name(&self) -> &'static str {
                #type_key
            }

            fn dependencies(&self) -> &'static [&'static str] {
                &[#(#dependencies),*]
            }

            fn create(
                &self,
                #lookup_param: &::std::sync::Arc<dyn ::di_abstractions::ComponentLookup>,
            ) -> ::di_abstractions::Instance {
                #lookup_import
                ::std::sync::Arc::new(#body)
            }

            #post_create
            #pre_destroy
        }
    })
}

fn registration(
    component: &ComponentMetadata,
    names: &ComponentNames,
) -> Result<(TokenStream, Vec<TokenStream>), CompileError> {
    let factory = names.factory();
    let name = component.name.as_str();
    let scope = match component.scope {
        Scope::Singleton => quote! { ::infrastructure_common::Scope::Singleton },
        Scope::Prototype => quote! { ::infrastructure_common::Scope::Prototype },
    };
    let lazy = component.lazy;
    let primary = component.primary;
    let path = type_path(&component.type_name)?;

    let mut capabilities = Vec::new();
    let mut casters = Vec::new();
    for capability in &component.capabilities {
        let caster = names.caster(capability.as_str());
        let view = capability_view(capability)?;
        let key = capability.as_str();
        capabilities.push(quote! { .with_capability(#key, #caster) });
        casters.push(quote! {
            fn #caster(
                instance: ::di_abstractions::Instance,
            ) -> ::std::option::Option<::di_abstractions::CapabilityView> {
                let typed: ::std::sync::Arc<#path> = instance.downcast::<#path>().ok()?;
                let view: #view = typed;
                ::std::option::Option::Some(::std::boxed::Box::new(view))
            }
        });
    }

    Ok((
        quote! {
            builder.push(
                ::di_impl::ComponentRegistration::new(
                    ::std::sync::Arc::new(#factory),
                    #name,
                    #scope,
                )
                .lazy(#lazy)
                .primary(#primary)
                #(#capabilities)*
            );
        },
        casters,
    ))
}
