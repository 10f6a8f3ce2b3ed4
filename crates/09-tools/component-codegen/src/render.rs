//! 源代码渲染

use infrastructure_common::CompileError;
use proc_macro2::TokenStream;

/// 生成文件的头部说明
pub const GENERATED_HEADER: &str = "// 此文件由 component-codegen 生成，请勿手动修改。\n\n";

/// 把生成的 token 格式化为源文件
pub fn render(tokens: TokenStream) -> Result<String, CompileError> {
    let file = syn::parse2::<syn::File>(tokens)
        .map_err(|e| CompileError::generation(format!("生成的代码无法解析: {e}")))?;
    Ok(format!("{GENERATED_HEADER}{}", prettyplease::unparse(&file)))
}
