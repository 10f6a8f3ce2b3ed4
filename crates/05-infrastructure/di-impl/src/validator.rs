//! 组件图验证流水线
//!
//! 条件过滤 → 结构检查 → 依赖解析 → 构建依赖图 → 环检测 → 接口冲突检查
//! → 拓扑排序 → 配置值求值。任一致命错误都会使整个构建失败，
//! 两种生成策略都以这里的输出为输入。

use crate::conflicts::InterfaceConflictValidator;
use crate::graph::DependencyGraph;
use crate::resolver::{DependencyResolver, Resolution};
use di_abstractions::{Binding, DependencySite, ResolvedGraph};
use infrastructure_common::{
    CompileError, ComponentMetadata, ConditionContext, ConditionEvaluator, ConfigError,
    ConfigurationResolver, DependencyKind, Diagnostics, IncludeAll, InjectionKind,
    InjectionPoint, LiteralResolver, Severity,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

/// 验证结果
#[derive(Debug, Clone)]
pub struct ValidatedGraph {
    /// 供代码生成使用的组件图
    pub resolved: ResolvedGraph,
    /// 硬依赖图
    pub dependency_graph: DependencyGraph,
}

/// 组件图验证器
pub struct GraphValidator {
    condition_evaluator: Arc<dyn ConditionEvaluator>,
    configuration: Arc<dyn ConfigurationResolver>,
    conflict_validator: InterfaceConflictValidator,
}

impl GraphValidator {
    /// 创建验证器：接受全部组件，配置表达式按字面处理
    pub fn new() -> Self {
        Self {
            condition_evaluator: Arc::new(IncludeAll),
            configuration: Arc::new(LiteralResolver),
            conflict_validator: InterfaceConflictValidator::new(),
        }
    }

    /// 设置条件求值器
    pub fn with_condition_evaluator(mut self, evaluator: Arc<dyn ConditionEvaluator>) -> Self {
        self.condition_evaluator = evaluator;
        self
    }

    /// 设置配置解析器
    pub fn with_configuration(mut self, configuration: Arc<dyn ConfigurationResolver>) -> Self {
        self.configuration = configuration;
        self
    }

    /// 验证组件并生成已解析的组件图
    pub fn validate(
        &self,
        components: Vec<ComponentMetadata>,
        diagnostics: &mut Diagnostics,
    ) -> Result<ValidatedGraph, Vec<CompileError>> {
        info!("开始验证组件图: {} 个候选组件", components.len());
        // 诊断收集器可能被复用，严格模式只统计本次验证新增的条目
        let first_entry = diagnostics.len();

        let components = self.filter_by_condition(components, diagnostics);
        let mut errors = Vec::new();

        check_duplicates(&components, &mut errors);
        for component in &components {
            check_structure(component, &mut errors);
        }

        let resolver = DependencyResolver::new(&components);
        let mut bindings = HashMap::new();
        let mut hard_edges: Vec<Vec<usize>> = vec![Vec::new(); components.len()];

        for (index, component) in components.iter().enumerate() {
            self.bind_dependencies(
                index,
                component,
                &resolver,
                &mut bindings,
                &mut hard_edges,
                &mut errors,
                diagnostics,
            );
            bind_depends_on(index, component, &resolver, &mut hard_edges, &mut errors);
        }

        let dependency_graph = build_graph(&components, &hard_edges);
        if let Some(cycle) = dependency_graph.detect_cycle() {
            let cycle = DependencyGraph::format_cycle(&cycle);
            diagnostics.error(format!("检测到循环依赖: {cycle}"), None);
            errors.push(CompileError::CircularDependency { cycle });
        }

        self.conflict_validator.validate(&components, diagnostics);
        self.conflict_validator.validate_names(&components, diagnostics);
        if diagnostics.is_strict() {
            errors.extend(
                diagnostics
                    .iter()
                    .skip(first_entry)
                    .filter(|entry| {
                        entry.severity == Severity::Error && entry.message.starts_with("[strict]")
                    })
                    .map(|entry| CompileError::Strict {
                        message: entry.message.clone(),
                    }),
            );
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let position: HashMap<&str, usize> = components
            .iter()
            .enumerate()
            .map(|(index, component)| (component.type_name.as_str(), index))
            .collect();
        let order: Vec<usize> = dependency_graph
            .topological_sort()
            .iter()
            .filter_map(|id| position.get(id.as_str()).copied())
            .collect();
        debug!("构造顺序: {:?}", order);

        self.resolve_values(&components, &mut bindings, &mut errors);
        if !errors.is_empty() {
            return Err(errors);
        }

        info!("组件图验证完成: {} 个组件", components.len());
        Ok(ValidatedGraph {
            resolved: ResolvedGraph::new(components, order, bindings, hard_edges),
            dependency_graph,
        })
    }

    fn filter_by_condition(
        &self,
        components: Vec<ComponentMetadata>,
        diagnostics: &mut Diagnostics,
    ) -> Vec<ComponentMetadata> {
        let keep: Vec<bool> = {
            let context = ConditionContext::new(&components);
            components
                .iter()
                .map(|component| match &component.condition {
                    Some(condition) => {
                        self.condition_evaluator
                            .matches(component, condition, &context)
                    }
                    None => true,
                })
                .collect()
        };

        components
            .into_iter()
            .zip(keep)
            .filter_map(|(component, keep)| {
                if !keep {
                    if let Some(condition) = &component.condition {
                        diagnostics.note(
                            format!("条件 {condition} 不满足，组件被排除"),
                            Some(&component.type_name),
                        );
                    }
                }
                keep.then_some(component)
            })
            .collect()
    }

    #[allow(clippy::too_many_arguments)]
    fn bind_dependencies(
        &self,
        index: usize,
        component: &ComponentMetadata,
        resolver: &DependencyResolver<'_>,
        bindings: &mut HashMap<DependencySite, Binding>,
        hard_edges: &mut [Vec<usize>],
        errors: &mut Vec<CompileError>,
        diagnostics: &mut Diagnostics,
    ) {
        for (point_index, dep_index, dependency) in component.dependencies() {
            if matches!(dependency.kind, DependencyKind::Value { .. }) {
                continue;
            }
            let site = DependencySite::new(index, point_index, dep_index);
            match resolver.resolve(dependency) {
                Resolution::Bound { index: target, ambiguous } => {
                    if ambiguous {
                        diagnostics.debug_note(
                            format!(
                                "依赖 {} 有多个候选，选用 {}",
                                dependency.lookup_type(),
                                resolver.component(target).type_name
                            ),
                            Some(&component.type_name),
                        );
                    }
                    if dependency.is_hard() && !hard_edges[index].contains(&target) {
                        hard_edges[index].push(target);
                    }
                    bindings.insert(site, Binding::Component(target));
                }
                Resolution::Absent => {
                    diagnostics.debug_note(
                        format!("可选依赖 {} 不存在", dependency.lookup_type()),
                        Some(&component.type_name),
                    );
                    bindings.insert(site, Binding::Absent);
                }
                Resolution::Missing => {
                    let point = &component.injection_points[point_index];
                    errors.push(CompileError::UnresolvedDependency {
                        component: component.type_name.to_string(),
                        point: describe_point(point),
                        position: dep_index + 1,
                        dependency_type: dependency.lookup_type().to_string(),
                        hint: resolver.missing_hint(dependency),
                    });
                }
            }
        }
    }

    fn resolve_values(
        &self,
        components: &[ComponentMetadata],
        bindings: &mut HashMap<DependencySite, Binding>,
        errors: &mut Vec<CompileError>,
    ) {
        for (index, component) in components.iter().enumerate() {
            for (point_index, dep_index, dependency) in component.dependencies() {
                let DependencyKind::Value { expression, target } = &dependency.kind else {
                    continue;
                };
                match self.configuration.resolve_as(expression, *target) {
                    Ok(value) => {
                        bindings.insert(
                            DependencySite::new(index, point_index, dep_index),
                            Binding::Value(value),
                        );
                    }
                    Err(error) => errors.push(CompileError::Conversion {
                        component: component.type_name.to_string(),
                        literal: expression.clone(),
                        target: target.to_string(),
                        message: conversion_message(&error),
                    }),
                }
            }
        }
    }
}

impl Default for GraphValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn conversion_message(error: &ConfigError) -> String {
    match error {
        ConfigError::TypeConversionError { literal, .. } => format!("解析结果为 '{literal}'"),
        other => other.to_string(),
    }
}

fn describe_point(point: &InjectionPoint) -> String {
    match point.kind {
        InjectionKind::Constructor => format!("构造函数 {}", point.target),
        InjectionKind::Field => format!("字段 {}", point.target),
        InjectionKind::Method => format!("方法 {}", point.target),
    }
}

fn check_duplicates(components: &[ComponentMetadata], errors: &mut Vec<CompileError>) {
    let mut seen = HashSet::new();
    for component in components {
        if !seen.insert(component.type_name.as_str()) {
            errors.push(CompileError::structural(
                component.type_name.as_str(),
                "同一类型被重复注册为组件",
            ));
        }
    }
}

fn check_structure(component: &ComponentMetadata, errors: &mut Vec<CompileError>) {
    let name = component.type_name.as_str();
    let constructors = component.points_of(InjectionKind::Constructor).count();
    if constructors > 1 {
        errors.push(CompileError::structural(
            name,
            format!("存在 {constructors} 个构造注入点，最多只能有一个"),
        ));
    }

    for point in &component.injection_points {
        match point.kind {
            InjectionKind::Method if point.modifiers.is_static => errors.push(
                CompileError::structural(name, format!("注入方法 '{}' 不能是静态方法", point.target)),
            ),
            InjectionKind::Method if point.modifiers.is_abstract => errors.push(
                CompileError::structural(name, format!("注入方法 '{}' 不能是抽象方法", point.target)),
            ),
            InjectionKind::Field => check_field(name, point, errors),
            _ => {}
        }
    }
}

fn check_field(component: &str, point: &InjectionPoint, errors: &mut Vec<CompileError>) {
    if point.modifiers.is_static {
        errors.push(CompileError::structural(
            component,
            format!("不支持对静态字段 '{}' 注入", point.target),
        ));
    }
    if point.modifiers.is_immutable && point.visibility.is_public() {
        errors.push(CompileError::structural(
            component,
            format!("不可变字段 '{}' 不能绕过访问器直接赋值", point.target),
        ));
    }
    if point.dependencies.len() != 1 {
        errors.push(CompileError::structural(
            component,
            format!(
                "字段 '{}' 必须恰好声明一个依赖，实际为 {}",
                point.target,
                point.dependencies.len()
            ),
        ));
    }
}

fn bind_depends_on(
    index: usize,
    component: &ComponentMetadata,
    resolver: &DependencyResolver<'_>,
    hard_edges: &mut [Vec<usize>],
    errors: &mut Vec<CompileError>,
) {
    for name in &component.depends_on {
        match resolver.resolve_name(name) {
            Some(target) => {
                if !hard_edges[index].contains(&target) {
                    hard_edges[index].push(target);
                }
            }
            None => errors.push(CompileError::UnknownDependsOn {
                component: component.type_name.to_string(),
                name: name.clone(),
                suggestion: resolver.suggest_name(name),
            }),
        }
    }
}

fn build_graph(components: &[ComponentMetadata], hard_edges: &[Vec<usize>]) -> DependencyGraph {
    let mut graph = DependencyGraph::new();
    for component in components {
        graph.add_component(component.type_name.clone());
    }
    for (from, targets) in hard_edges.iter().enumerate() {
        for &to in targets {
            graph.add_dependency(
                components[from].type_name.clone(),
                components[to].type_name.clone(),
            );
        }
    }
    graph
}
