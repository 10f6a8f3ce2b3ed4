//! 依赖图
//!
//! 以组件类型为节点的有向图，边 `from -> to` 表示 from 依赖 to。
//! 节点和出边都保持插入顺序，因此环检测和拓扑排序的结果对固定输入是确定的。

use infrastructure_common::{simple_name, TypeName};
use serde_json::json;
use std::collections::HashMap;
use std::fmt::Write as _;

/// 依赖图
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<TypeName>,
    index: HashMap<TypeName, usize>,
    edges: Vec<Vec<usize>>,
}

impl DependencyGraph {
    /// 创建空图
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加节点，已存在时忽略
    pub fn add_component(&mut self, id: impl Into<TypeName>) -> usize {
        let id = id.into();
        if let Some(&position) = self.index.get(&id) {
            return position;
        }
        let position = self.nodes.len();
        self.index.insert(id.clone(), position);
        self.nodes.push(id);
        self.edges.push(Vec::new());
        position
    }

    /// 添加依赖边 from -> to，缺失的节点自动添加，重复边忽略
    pub fn add_dependency(&mut self, from: impl Into<TypeName>, to: impl Into<TypeName>) {
        let from = self.add_component(from);
        let to = self.add_component(to);
        if !self.edges[from].contains(&to) {
            self.edges[from].push(to);
        }
    }

    /// 节点数量
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 边数量
    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(Vec::len).sum()
    }

    /// 是否包含节点
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// 按插入顺序的全部节点
    pub fn components(&self) -> &[TypeName] {
        &self.nodes
    }

    /// 节点的直接依赖，按边的插入顺序
    pub fn dependencies_of(&self, id: &str) -> Vec<&TypeName> {
        self.index
            .get(id)
            .map(|&position| self.edges[position].iter().map(|&to| &self.nodes[to]).collect())
            .unwrap_or_default()
    }

    /// 直接依赖该节点的节点
    pub fn dependents_of(&self, id: &str) -> Vec<&TypeName> {
        let Some(&target) = self.index.get(id) else {
            return Vec::new();
        };
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, targets)| targets.contains(&target))
            .map(|(from, _)| &self.nodes[from])
            .collect()
    }

    /// 没有被任何节点依赖的节点
    pub fn root_components(&self) -> Vec<&TypeName> {
        let mut has_incoming = vec![false; self.nodes.len()];
        for targets in &self.edges {
            for &to in targets {
                has_incoming[to] = true;
            }
        }
        self.nodes
            .iter()
            .zip(has_incoming)
            .filter(|(_, incoming)| !incoming)
            .map(|(node, _)| node)
            .collect()
    }

    /// 没有任何依赖的节点
    pub fn leaf_components(&self) -> Vec<&TypeName> {
        self.nodes
            .iter()
            .zip(&self.edges)
            .filter(|(_, targets)| targets.is_empty())
            .map(|(node, _)| node)
            .collect()
    }

    /// 检测环
    ///
    /// 深度优先遍历，遇到当前路径上的节点即报告环。返回的路径从该节点
    /// 首次进入路径处开始，到它再次出现为止，首尾相同；自依赖返回 `[A, A]`。
    /// 遍历使用显式栈，依赖链的深度不受线程栈大小限制。
    pub fn detect_cycle(&self) -> Option<Vec<TypeName>> {
        let mut visited = vec![false; self.nodes.len()];
        let mut on_path = vec![false; self.nodes.len()];

        for start in 0..self.nodes.len() {
            if visited[start] {
                continue;
            }
            if let Some(cycle) = self.find_cycle(start, &mut visited, &mut on_path) {
                return Some(cycle.into_iter().map(|n| self.nodes[n].clone()).collect());
            }
        }
        None
    }

    fn find_cycle(&self, start: usize, visited: &mut [bool], on_path: &mut [bool]) -> Option<Vec<usize>> {
        // (节点, 下一条待访问的边)，栈中节点即当前路径
        let mut stack = vec![(start, 0usize)];
        visited[start] = true;
        on_path[start] = true;

        while let Some(frame) = stack.last_mut() {
            let (current, edge) = *frame;
            match self.edges[current].get(edge) {
                Some(&next) => {
                    frame.1 += 1;
                    if on_path[next] {
                        let from = stack.iter().position(|&(n, _)| n == next).unwrap_or(0);
                        let mut cycle: Vec<usize> = stack[from..].iter().map(|&(n, _)| n).collect();
                        cycle.push(next);
                        return Some(cycle);
                    }
                    if !visited[next] {
                        visited[next] = true;
                        on_path[next] = true;
                        stack.push((next, 0));
                    }
                }
                None => {
                    on_path[current] = false;
                    stack.pop();
                }
            }
        }
        None
    }

    /// 拓扑排序，依赖排在依赖者之前
    ///
    /// 调用前必须先用 [`detect_cycle`](Self::detect_cycle) 确认无环。
    pub fn topological_sort(&self) -> Vec<TypeName> {
        let mut visited = vec![false; self.nodes.len()];
        let mut order = Vec::with_capacity(self.nodes.len());
        for start in 0..self.nodes.len() {
            self.visit(start, &mut visited, &mut order);
        }
        order.into_iter().map(|n| self.nodes[n].clone()).collect()
    }

    /// 后序遍历，节点在其全部依赖之后进入 `order`
    fn visit(&self, start: usize, visited: &mut [bool], order: &mut Vec<usize>) {
        if visited[start] {
            return;
        }
        visited[start] = true;
        let mut stack = vec![(start, 0usize)];

        while let Some(frame) = stack.last_mut() {
            let (current, edge) = *frame;
            match self.edges[current].get(edge) {
                Some(&next) => {
                    frame.1 += 1;
                    if !visited[next] {
                        visited[next] = true;
                        stack.push((next, 0));
                    }
                }
                None => {
                    order.push(current);
                    stack.pop();
                }
            }
        }
    }

    /// 把环路径格式化为简单名称箭头链
    pub fn format_cycle<S: AsRef<str>>(cycle: &[S]) -> String {
        cycle
            .iter()
            .map(|id| simple_name(id.as_ref()))
            .collect::<Vec<_>>()
            .join(" → ")
    }

    /// 导出为 Graphviz DOT
    pub fn to_dot(&self) -> String {
        let mut dot = String::from("digraph dependencies {\n    rankdir=LR;\n    node [shape=box];\n");
        for node in &self.nodes {
            let _ = writeln!(dot, "    \"{}\" [label=\"{}\"];", node, node.simple_name());
        }
        for (from, targets) in self.edges.iter().enumerate() {
            for &to in targets {
                let _ = writeln!(dot, "    \"{}\" -> \"{}\";", self.nodes[from], self.nodes[to]);
            }
        }
        dot.push_str("}\n");
        dot
    }

    /// 导出为 JSON
    pub fn to_json(&self) -> serde_json::Value {
        let edges: Vec<_> = self
            .edges
            .iter()
            .enumerate()
            .flat_map(|(from, targets)| {
                targets.iter().map(move |&to| {
                    json!({ "from": self.nodes[from].as_str(), "to": self.nodes[to].as_str() })
                })
            })
            .collect();
        json!({
            "nodes": self.nodes.iter().map(TypeName::as_str).collect::<Vec<_>>(),
            "edges": edges,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[TypeName]) -> Vec<&str> {
        list.iter().map(TypeName::as_str).collect()
    }

    #[test]
    fn test_chain_topological_order() {
        let mut graph = DependencyGraph::new();
        graph.add_component("A");
        graph.add_component("B");
        graph.add_component("C");
        graph.add_dependency("A", "B");
        graph.add_dependency("B", "C");

        assert!(graph.detect_cycle().is_none());
        assert_eq!(names(&graph.topological_sort()), vec!["C", "B", "A"]);
    }

    #[test]
    fn test_two_node_cycle() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("app::X", "app::Y");
        graph.add_dependency("app::Y", "app::X");

        let cycle = graph.detect_cycle().expect("应当检测到环");
        assert_eq!(names(&cycle), vec!["app::X", "app::Y", "app::X"]);
        assert_eq!(DependencyGraph::format_cycle(&cycle), "X → Y → X");
    }

    #[test]
    fn test_self_dependency() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("A", "A");
        assert_eq!(names(&graph.detect_cycle().unwrap()), vec!["A", "A"]);
    }

    #[test]
    fn test_cycle_witness_starts_at_reentry() {
        // R -> A -> B -> C -> A：环不包含 R
        let mut graph = DependencyGraph::new();
        graph.add_dependency("R", "A");
        graph.add_dependency("A", "B");
        graph.add_dependency("B", "C");
        graph.add_dependency("C", "A");
        assert_eq!(names(&graph.detect_cycle().unwrap()), vec!["A", "B", "C", "A"]);
    }

    #[test]
    fn test_deep_chain_does_not_overflow_stack() {
        const DEPTH: usize = 100_000;
        let mut graph = DependencyGraph::new();
        for i in 0..DEPTH - 1 {
            graph.add_dependency(format!("N{i}"), format!("N{}", i + 1));
        }

        assert!(graph.detect_cycle().is_none());
        let order = graph.topological_sort();
        assert_eq!(order.len(), DEPTH);
        assert_eq!(order[0].as_str(), format!("N{}", DEPTH - 1));
        assert_eq!(order[DEPTH - 1].as_str(), "N0");

        // 链尾指回链首，环覆盖整条链
        graph.add_dependency(format!("N{}", DEPTH - 1), "N0");
        let cycle = graph.detect_cycle().expect("应当检测到环");
        assert_eq!(cycle.len(), DEPTH + 1);
        assert_eq!(cycle.first(), cycle.last());
    }

    #[test]
    fn test_format_cycle_edge_cases() {
        let empty: Vec<TypeName> = Vec::new();
        assert_eq!(DependencyGraph::format_cycle(&empty), "");
        assert_eq!(DependencyGraph::format_cycle(&["a::b::Only"]), "Only");
    }

    #[test]
    fn test_duplicate_edges_ignored() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("A", "B");
        graph.add_dependency("A", "B");
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_roots_and_leaves() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("A", "B");
        graph.add_dependency("A", "C");
        graph.add_dependency("B", "C");
        graph.add_component("D");

        assert_eq!(names_ref(&graph.root_components()), vec!["A", "D"]);
        assert_eq!(names_ref(&graph.leaf_components()), vec!["C", "D"]);
        assert_eq!(names_ref(&graph.dependents_of("C")), vec!["A", "B"]);
        assert_eq!(names_ref(&graph.dependencies_of("A")), vec!["B", "C"]);
    }

    fn names_ref<'a>(list: &[&'a TypeName]) -> Vec<&'a str> {
        list.iter().map(|n| n.as_str()).collect()
    }

    #[test]
    fn test_exports() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("app::A", "app::B");

        let dot = graph.to_dot();
        assert!(dot.contains("\"app::A\" -> \"app::B\";"));
        assert!(dot.contains("[label=\"B\"]"));

        let json = graph.to_json();
        assert_eq!(json["nodes"].as_array().unwrap().len(), 2);
        assert_eq!(json["edges"][0]["from"], "app::A");
    }

    /// 简单线性同余生成器，保证测试可重复
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self, bound: usize) -> usize {
            self.0 = self.0.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            ((self.0 >> 33) as usize) % bound
        }
    }

    #[test]
    fn test_random_dags_sort_dependencies_first() {
        let mut rng = Lcg(42);
        for _ in 0..200 {
            let size = 1 + rng.next(12);
            let mut graph = DependencyGraph::new();
            let mut edges = Vec::new();
            for i in 0..size {
                graph.add_component(format!("N{i}"));
            }
            // 只允许从大序号指向小序号，保证无环
            for _ in 0..rng.next(size * 2 + 1) {
                let from = rng.next(size);
                let to = rng.next(size);
                if to < from {
                    graph.add_dependency(format!("N{from}"), format!("N{to}"));
                    edges.push((from, to));
                }
            }

            assert!(graph.detect_cycle().is_none());
            let order = graph.topological_sort();
            assert_eq!(order.len(), size);
            let position = |n: usize| {
                order
                    .iter()
                    .position(|id| id.as_str() == format!("N{n}"))
                    .unwrap()
            };
            for (from, to) in edges {
                assert!(position(to) < position(from));
            }
        }
    }

    #[test]
    fn test_random_cyclic_graphs_report_closed_path() {
        let mut rng = Lcg(7);
        for _ in 0..200 {
            let size = 2 + rng.next(10);
            let mut graph = DependencyGraph::new();
            for _ in 0..rng.next(size * 2) {
                graph.add_dependency(format!("N{}", rng.next(size)), format!("N{}", rng.next(size)));
            }
            // 强制加入一个环
            let a = rng.next(size);
            let b = rng.next(size);
            graph.add_dependency(format!("N{a}"), format!("N{b}"));
            graph.add_dependency(format!("N{b}"), format!("N{a}"));

            let cycle = graph.detect_cycle().expect("应当检测到环");
            assert!(cycle.len() >= 2);
            assert_eq!(cycle.first(), cycle.last());
            for pair in cycle.windows(2) {
                assert!(graph
                    .dependencies_of(pair[0].as_str())
                    .contains(&&pair[1]));
            }
        }
    }
}
