//! Cross-reference validation over a whole manifest
//!
//! Resolves metric -> measure references against a full-name index, derived
//! metric -> metric references against the metric list, detects cycles in
//! the derived-metric graph, and checks manifest-wide name uniqueness.
//! Read-only and deterministic: the same manifest always yields the same
//! findings in the same order.

use crate::manifest::{measure_full_name, Manifest, Metric};
use crate::path::FieldPath;
use crate::suggest::suggestion_for;
use crate::validation::{ErrorCode, ValidationError, ValidationOptions};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Where a measure lives in the manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasureEntry {
    pub model: String,
    pub measure: String,
    pub model_index: usize,
    pub measure_index: usize,
}

/// Lookup from measure full name (`model.measure`) to its definition
///
/// The first definition of a full name wins; repeats are reported by the
/// uniqueness checks instead.
#[derive(Debug, Clone, Default)]
pub struct MeasureIndex {
    entries: HashMap<String, MeasureEntry>,
    order: Vec<String>,
}

impl MeasureIndex {
    /// Index every named measure of every named model
    pub fn build(manifest: &Manifest) -> Self {
        let mut index = Self::default();
        for (model_index, model) in manifest.semantic_models.iter().enumerate() {
            if model.name.trim().is_empty() {
                continue;
            }
            for (measure_index, measure) in model.measures.iter().enumerate() {
                if measure.name.trim().is_empty() {
                    continue;
                }
                index.insert(MeasureEntry {
                    model: model.name.clone(),
                    measure: measure.name.clone(),
                    model_index,
                    measure_index,
                });
            }
        }
        index
    }

    fn insert(&mut self, entry: MeasureEntry) {
        let full_name = measure_full_name(&entry.model, &entry.measure);
        if !self.entries.contains_key(&full_name) {
            self.order.push(full_name.clone());
            self.entries.insert(full_name, entry);
        }
    }

    /// Look up a full name
    pub fn resolve(&self, full_name: &str) -> Option<&MeasureEntry> {
        self.entries.get(full_name)
    }

    pub fn contains(&self, full_name: &str) -> bool {
        self.entries.contains_key(full_name)
    }

    /// Full names in manifest order
    pub fn full_names(&self) -> impl Iterator<Item = &str> + Clone {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// One `UNKNOWN_MEASURE_REFERENCE` per unresolved measure reference of
    /// `metric`, located under its `type_params` path
    pub fn check_metric(
        &self,
        metric: &Metric,
        params: &FieldPath,
        options: &ValidationOptions,
    ) -> Vec<ValidationError> {
        metric
            .measure_references()
            .into_iter()
            .filter(|(_, reference)| !self.contains(reference))
            .map(|(field, reference)| {
                let hint = suggestion_for(reference, self.full_names(), options).unwrap_or_else(
                    || "No measures are defined in any semantic model".to_string(),
                );
                ValidationError::error(
                    ErrorCode::UnknownMeasureReference,
                    format!(
                        "metric '{}' references unknown measure '{}'",
                        metric.name, reference
                    ),
                    &params.field(field),
                )
                .with_suggestion(hint)
            })
            .collect()
    }
}

/// Directed graph of derived-metric references (referrer -> referenced)
#[derive(Debug)]
pub struct MetricGraph {
    graph: DiGraph<String, ()>,

    /// Map from metric name to node index
    node_map: HashMap<String, NodeIndex>,

    /// Manifest index of the metric each node came from
    origin: Vec<usize>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

struct Frame {
    node: NodeIndex,
    successors: Vec<NodeIndex>,
    next: usize,
}

/// One cycle found in the metric graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricCycle {
    /// Metric names along the cycle, start repeated at the end
    pub path: Vec<String>,
    /// Manifest index of the metric whose reference closes the cycle
    pub closing_metric: usize,
}

impl MetricGraph {
    /// Build the graph; references to unknown metrics are left out
    pub fn build(manifest: &Manifest) -> Self {
        let mut graph = DiGraph::new();
        let mut node_map = HashMap::new();
        let mut origin = Vec::new();

        for (i, metric) in manifest.metrics.iter().enumerate() {
            if metric.name.trim().is_empty() || node_map.contains_key(&metric.name) {
                continue;
            }
            let idx = graph.add_node(metric.name.clone());
            node_map.insert(metric.name.clone(), idx);
            origin.push(i);
        }

        for metric in &manifest.metrics {
            let Some(&from) = node_map.get(&metric.name) else {
                continue;
            };
            for reference in metric.metric_references() {
                if let Some(&to) = node_map.get(reference) {
                    graph.update_edge(from, to, ());
                }
            }
        }

        Self {
            graph,
            node_map,
            origin,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.node_map.contains_key(name)
    }

    /// Direct references of a node, in the order they were declared
    fn successors(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut out: Vec<NodeIndex> = self.graph.neighbors(node).collect();
        // petgraph yields the most recently added edge first
        out.reverse();
        out
    }

    /// Every cycle closed by a back edge of a three-color depth-first
    /// traversal, rooted at each unvisited metric in manifest order
    pub fn find_cycles(&self) -> Vec<MetricCycle> {
        let mut color = vec![Color::White; self.graph.node_count()];
        let mut cycles = Vec::new();

        for root in self.graph.node_indices() {
            if color[root.index()] != Color::White {
                continue;
            }
            color[root.index()] = Color::Gray;
            let mut stack = vec![Frame {
                node: root,
                successors: self.successors(root),
                next: 0,
            }];

            while let Some(frame) = stack.last_mut() {
                if frame.next >= frame.successors.len() {
                    color[frame.node.index()] = Color::Black;
                    stack.pop();
                    continue;
                }
                let from = frame.node;
                let to = frame.successors[frame.next];
                frame.next += 1;

                match color[to.index()] {
                    Color::White => {
                        color[to.index()] = Color::Gray;
                        stack.push(Frame {
                            node: to,
                            successors: self.successors(to),
                            next: 0,
                        });
                    }
                    Color::Gray => {
                        let start = stack.iter().position(|f| f.node == to).unwrap_or(0);
                        let mut path: Vec<String> = stack[start..]
                            .iter()
                            .map(|f| self.graph[f.node].clone())
                            .collect();
                        path.push(self.graph[to].clone());
                        cycles.push(MetricCycle {
                            path,
                            closing_metric: self.origin[from.index()],
                        });
                    }
                    Color::Black => {}
                }
            }
        }

        cycles
    }
}

/// [`validate_cross_references_with`] using default options
pub fn validate_cross_references(manifest: &Manifest) -> Vec<ValidationError> {
    validate_cross_references_with(manifest, &ValidationOptions::default())
}

/// All cross-entity findings for the manifest
pub fn validate_cross_references_with(
    manifest: &Manifest,
    options: &ValidationOptions,
) -> Vec<ValidationError> {
    let root = FieldPath::root();
    let mut issues = Vec::new();

    let measures = MeasureIndex::build(manifest);
    for (i, metric) in manifest.metrics.iter().enumerate() {
        let params = root.index("metrics", i).field("type_params");
        issues.extend(measures.check_metric(metric, &params, options));
    }

    let graph = MetricGraph::build(manifest);
    issues.extend(check_metric_references(manifest, &graph, options));

    for cycle in graph.find_cycles() {
        issues.push(
            ValidationError::error(
                ErrorCode::CircularMetricDependency,
                format!("Circular metric dependency: {}", cycle.path.join(" -> ")),
                &root
                    .index("metrics", cycle.closing_metric)
                    .field("type_params")
                    .field("metrics"),
            )
            .with_suggestion("Remove one of the metric references along the cycle")
            .with_cycle(cycle.path),
        );
    }

    issues.extend(check_unique_names(
        manifest.semantic_models.iter().map(|m| m.name.as_str()),
        "semantic_models",
        "semantic model",
        ErrorCode::DuplicateModelName,
    ));
    issues.extend(check_unique_names(
        manifest.metrics.iter().map(|m| m.name.as_str()),
        "metrics",
        "metric",
        ErrorCode::DuplicateMetricName,
    ));

    log::debug!(
        "Cross-reference validation: {} measures indexed, {} findings",
        measures.len(),
        issues.len()
    );

    issues
}

fn check_metric_references(
    manifest: &Manifest,
    graph: &MetricGraph,
    options: &ValidationOptions,
) -> Vec<ValidationError> {
    let root = FieldPath::root();
    let known = || {
        manifest
            .metrics
            .iter()
            .map(|m| m.name.as_str())
            .filter(|n| !n.trim().is_empty())
    };

    let mut issues = Vec::new();
    for (i, metric) in manifest.metrics.iter().enumerate() {
        for (j, reference) in metric.metric_references().iter().enumerate() {
            if graph.contains(reference) {
                continue;
            }
            let mut issue = ValidationError::error(
                ErrorCode::UnknownMetricReference,
                format!(
                    "metric '{}' references unknown metric '{}'",
                    metric.name, reference
                ),
                &root
                    .index("metrics", i)
                    .field("type_params")
                    .index("metrics", j),
            );
            if let Some(hint) = suggestion_for(reference, known(), options) {
                issue = issue.with_suggestion(hint);
            }
            issues.push(issue);
        }
    }
    issues
}

/// Every occurrence of a name after its first, manifest-wide
fn check_unique_names<'a>(
    names: impl Iterator<Item = &'a str>,
    array: &str,
    label: &str,
    code: ErrorCode,
) -> Vec<ValidationError> {
    let root = FieldPath::root();
    let mut first_at: HashMap<&str, usize> = HashMap::new();
    let mut issues = Vec::new();

    for (i, name) in names.enumerate() {
        if name.trim().is_empty() {
            continue;
        }
        let Some(&first) = first_at.get(name) else {
            first_at.insert(name, i);
            continue;
        };
        issues.push(ValidationError::error(
            code,
            format!(
                "Duplicate {} name '{}' (first defined at {})",
                label,
                name,
                root.index(array, first)
            ),
            &root.index(array, i).field("name"),
        ));
    }
    issues
}

#[cfg(test)]
#[path = "cross_reference_test.rs"]
mod tests;
