//! 依赖表达式
//!
//! 每个依赖位置按依赖种类和构建期绑定结果生成一个表达式。两种生成策略只在
//! 「如何取得目标组件」上不同，由 [`DependencySource`] 抽象。

use di_abstractions::{Binding, DependencySite, ResolvedGraph};
use infrastructure_common::{CompileError, ConfiguredValue, DependencyKind, TypeName};
use proc_macro2::{Literal, TokenStream};
use quote::quote;

/// 解析组件类型路径
pub fn type_path(type_name: &TypeName) -> Result<syn::Path, CompileError> {
    syn::parse_str::<syn::Path>(type_name.as_str()).map_err(|e| CompileError::InvalidTypePath {
        type_name: type_name.to_string(),
        message: e.to_string(),
    })
}

/// 能力类型视图 `Arc<dyn Capability>`
pub fn capability_view(capability: &TypeName) -> Result<TokenStream, CompileError> {
    let path = type_path(capability)?;
    Ok(quote! { ::std::sync::Arc<dyn #path> })
}

/// 取得目标组件的方式
pub trait DependencySource {
    /// 目标组件实例，类型为 `Arc<T>`
    fn instance(&self, graph: &ResolvedGraph, target: usize) -> Result<TokenStream, CompileError>;

    /// 每次调用返回目标组件实例的可调用对象
    ///
    /// `view` 给出时，可调用对象的返回类型声明为该能力类型视图。
    fn supplier(
        &self,
        graph: &ResolvedGraph,
        target: usize,
        view: Option<TokenStream>,
    ) -> Result<TokenStream, CompileError>;
}

/// 生成单个依赖位置的表达式
pub fn dependency_expression(
    graph: &ResolvedGraph,
    site: DependencySite,
    source: &dyn DependencySource,
) -> Result<TokenStream, CompileError> {
    let component = graph.component(site.component);
    let dependency = &component.injection_points[site.point].dependencies[site.dependency];
    let binding = graph.binding(site).ok_or_else(|| {
        CompileError::generation(format!(
            "{} 的依赖 {} 没有绑定结果",
            component.type_name,
            dependency.lookup_type()
        ))
    })?;

    // 声明类型与绑定组件的具体类型不同时，包装类型需要显式的能力类型视图
    let view = |target: usize| -> Result<Option<TokenStream>, CompileError> {
        let lookup = dependency.lookup_type();
        if &graph.component(target).type_name == lookup {
            Ok(None)
        } else {
            capability_view(lookup).map(Some)
        }
    };

    match (&dependency.kind, binding) {
        (DependencyKind::Value { .. }, Binding::Value(value)) => Ok(value_literal(value)),
        (DependencyKind::Direct, Binding::Component(target)) => source.instance(graph, *target),
        (DependencyKind::Provider, Binding::Component(target)) => {
            let supplier = source.supplier(graph, *target, view(*target)?)?;
            Ok(quote! { ::di_impl::Provider::new(#supplier) })
        }
        (DependencyKind::Lazy, Binding::Component(target)) => {
            let supplier = source.supplier(graph, *target, view(*target)?)?;
            Ok(quote! { ::di_impl::LazyRef::new(#supplier) })
        }
        (DependencyKind::Optional, Binding::Component(target)) => {
            let supplier = source.supplier(graph, *target, view(*target)?)?;
            Ok(quote! { ::di_impl::OptionalRef::present(#supplier) })
        }
        (DependencyKind::Optional, Binding::Absent) => {
            Ok(quote! { ::di_impl::OptionalRef::absent() })
        }
        (kind, binding) => Err(CompileError::generation(format!(
            "{} 的 {} 依赖 {} 绑定结果不一致: {:?}",
            component.type_name,
            kind.label(),
            dependency.lookup_type(),
            binding
        ))),
    }
}

/// 配置值字面量
pub fn value_literal(value: &ConfiguredValue) -> TokenStream {
    match value {
        ConfiguredValue::String(text) => quote! { ::std::string::String::from(#text) },
        ConfiguredValue::Bool(flag) => quote! { #flag },
        ConfiguredValue::Char(c) => {
            let literal = Literal::character(*c);
            quote! { #literal }
        }
        ConfiguredValue::I8(n) => literal(Literal::i8_suffixed(*n)),
        ConfiguredValue::I16(n) => literal(Literal::i16_suffixed(*n)),
        ConfiguredValue::I32(n) => literal(Literal::i32_suffixed(*n)),
        ConfiguredValue::I64(n) => literal(Literal::i64_suffixed(*n)),
        ConfiguredValue::U8(n) => literal(Literal::u8_suffixed(*n)),
        ConfiguredValue::U16(n) => literal(Literal::u16_suffixed(*n)),
        ConfiguredValue::U32(n) => literal(Literal::u32_suffixed(*n)),
        ConfiguredValue::U64(n) => literal(Literal::u64_suffixed(*n)),
        ConfiguredValue::Usize(n) => literal(Literal::usize_suffixed(*n)),
        ConfiguredValue::F32(n) => float_literal(f64::from(*n), quote! { f32 }, || {
            Literal::f32_suffixed(*n)
        }),
        ConfiguredValue::F64(n) => float_literal(*n, quote! { f64 }, || Literal::f64_suffixed(*n)),
    }
}

fn literal(literal: Literal) -> TokenStream {
    quote! { #literal }
}

/// 非有限浮点数没有字面量形式，改用常量
fn float_literal(value: f64, ty: TokenStream, finite: impl FnOnce() -> Literal) -> TokenStream {
    if value.is_nan() {
        quote! { #ty::NAN }
    } else if value == f64::INFINITY {
        quote! { #ty::INFINITY }
    } else if value == f64::NEG_INFINITY {
        quote! { #ty::NEG_INFINITY }
    } else {
        let literal = finite();
        quote! { #literal }
    }
}
