//! # Generated Runtime Tests
//!
//! 把 DI 编译器的产物编译进来并在运行时检查其行为。`build.rs` 按
//! `app.components.toml` 生成两种策略的代码，组件类型定义在 [`app`] 中。

pub mod app;

/// 直接生成策略的产物
pub mod direct {
    include!(concat!(env!("OUT_DIR"), "/di_container.rs"));
}

/// 间接生成策略的产物
pub mod indirect {
    include!(concat!(env!("OUT_DIR"), "/di_registry.rs"));
}
