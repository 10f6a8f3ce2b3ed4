//! 创建例程
//!
//! 两种生成策略共用的实例构造代码：构造注入（或 `Default`），随后依次执行
//! 字段注入和方法注入。私有字段经由织入的 `__di_set_<field>` 访问器赋值。

use crate::expressions::{dependency_expression, type_path, DependencySource};
use crate::naming::ident;
use di_abstractions::{DependencySite, ResolvedGraph};
use infrastructure_common::{CompileError, InjectionKind};
use proc_macro2::TokenStream;
use quote::quote;

/// 生成构造表达式，求值结果为尚未包装的组件实例
pub fn construction(
    graph: &ResolvedGraph,
    index: usize,
    source: &dyn DependencySource,
) -> Result<TokenStream, CompileError> {
    let component = graph.component(index);
    let path = type_path(&component.type_name)?;

    let arguments = |point_index: usize| -> Result<Vec<TokenStream>, CompileError> {
        (0..component.injection_points[point_index].dependencies.len())
            .map(|dep_index| {
                dependency_expression(graph, DependencySite::new(index, point_index, dep_index), source)
            })
            .collect()
    };

    let constructor = component
        .injection_points
        .iter()
        .position(|point| point.kind == InjectionKind::Constructor);
    let create = match constructor {
        Some(point_index) => {
            let target = ident(&component.injection_points[point_index].target);
            let args = arguments(point_index)?;
            quote! { #path::#target(#(#args),*) }
        }
        None => quote! { <#path as ::core::default::Default>::default() },
    };

    let mut members = Vec::new();
    for (point_index, point) in component.injection_points.iter().enumerate() {
        match point.kind {
            InjectionKind::Constructor => {}
            InjectionKind::Field => {
                let mut args = arguments(point_index)?;
                let value = args.pop().ok_or_else(|| {
                    CompileError::structural(
                        component.type_name.as_str(),
                        format!("字段 '{}' 没有依赖", point.target),
                    )
                })?;
                members.push(match point.accessor_name() {
                    Some(accessor) => {
                        let accessor = ident(&accessor);
                        quote! { instance.#accessor(#value); }
                    }
                    None => {
                        let field = ident(&point.target);
                        quote! { instance.#field = #value; }
                    }
                });
            }
            InjectionKind::Method => {
                let method = ident(&point.target);
                let args = arguments(point_index)?;
                members.push(quote! { instance.#method(#(#args),*); });
            }
        }
    }

    if members.is_empty() {
        return Ok(create);
    }
    Ok(quote! {
        {
            let mut instance = #create;
            #(#members)*
            instance
        }
    })
}

/// 生命周期钩子调用语句，`receiver` 为实例表达式
pub fn hook_call(method: Option<&String>, receiver: &TokenStream) -> Option<TokenStream> {
    method.map(|method| {
        let method = ident(method);
        quote! { #receiver.#method(); }
    })
}
