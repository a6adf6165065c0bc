//! Reporting of resolution outcomes.
//!
//! Successful reports name the strategy that fired so an unexpected
//! fallback is visible. Failures list every attempted strategy with its
//! candidate count, plus the ancestor failure when narrowing was impossible.

use crate::locator::LocatorSpec;
use crate::resolution::{Attempt, ResolutionOutcome, ResolverError};
use crate::strategy::StrategyId;
use locus_common::{DocumentTree, NodeId};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Resolved,
    NoMatch,
    Ambiguous,
    Detached,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeReport {
    pub id: NodeId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl NodeReport {
    fn new(tree: &DocumentTree, id: NodeId) -> Self {
        let path = tree.node(id).ok().and_then(|n| n.path().ok());
        Self { id, path }
    }
}

/// Serializable form of a [`ResolutionOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionReport {
    pub status: ReportStatus,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<NodeReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<StrategyId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<NodeReport>,
    pub attempts: Vec<Attempt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ancestor: Option<Box<ResolutionReport>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResolutionReport {
    pub fn from_outcome(spec: &LocatorSpec, outcome: &ResolutionOutcome, tree: &DocumentTree) -> Self {
        match outcome {
            Ok(resolved) => Self {
                status: ReportStatus::Resolved,
                target: spec.to_string(),
                node: Some(NodeReport::new(tree, resolved.node)),
                strategy: Some(resolved.strategy),
                count: None,
                candidates: Vec::new(),
                attempts: resolved.attempts.clone(),
                ancestor: None,
                error: None,
            },
            Err(err) => Self::from_error(spec, err, tree),
        }
    }

    fn from_error(spec: &LocatorSpec, err: &ResolverError, tree: &DocumentTree) -> Self {
        let ancestor = match (err.ancestor(), spec.ancestor.as_deref()) {
            (Some(inner), Some(ancestor_spec)) => {
                Some(Box::new(Self::from_error(ancestor_spec, inner, tree)))
            }
            _ => None,
        };
        let (status, count, candidates) = match err {
            ResolverError::NoMatch { .. } => (ReportStatus::NoMatch, None, Vec::new()),
            ResolverError::AmbiguousMatch {
                count, candidates, ..
            } => (
                ReportStatus::Ambiguous,
                Some(*count),
                candidates.iter().map(|&id| NodeReport::new(tree, id)).collect(),
            ),
            ResolverError::Detached(_) => (ReportStatus::Detached, None, Vec::new()),
        };

        Self {
            status,
            target: spec.to_string(),
            node: None,
            strategy: None,
            count,
            candidates,
            attempts: err.attempts().to_vec(),
            ancestor,
            error: Some(err.to_string()),
        }
    }
}

/// Human-readable report.
///
/// ```text
/// resolved input[placeholder="Username"] via generic_attribute
///   node: [2] div#root > form#login-form > input[type="text"][placeholder="Username"]
///   attempts: generic_attribute=1
/// ```
pub fn format_outcome(spec: &LocatorSpec, outcome: &ResolutionOutcome, tree: &DocumentTree) -> String {
    format_report(&ResolutionReport::from_outcome(spec, outcome, tree))
}

pub fn format_report(report: &ResolutionReport) -> String {
    let mut output = String::new();
    write_report(&mut output, report, 0);
    output
}

fn write_report(output: &mut String, report: &ResolutionReport, depth: usize) {
    let pad = "  ".repeat(depth);

    let headline = match report.status {
        ReportStatus::Resolved => match report.strategy {
            Some(strategy) => format!("resolved {} via {}", report.target, strategy),
            None => format!("resolved {}", report.target),
        },
        ReportStatus::NoMatch => format!("no match for {}", report.target),
        ReportStatus::Ambiguous => format!(
            "ambiguous: {} matches {} elements",
            report.target,
            report.count.unwrap_or(report.candidates.len())
        ),
        ReportStatus::Detached => format!(
            "detached: {}",
            report.error.as_deref().unwrap_or("snapshot is stale")
        ),
    };
    output.push_str(&format!("{}{}\n", pad, headline));

    if let Some(node) = &report.node {
        output.push_str(&format!("{}  node: {}\n", pad, format_node(node)));
    }

    for candidate in &report.candidates {
        output.push_str(&format!("{}  candidate: {}\n", pad, format_node(candidate)));
    }

    if !report.attempts.is_empty() {
        let attempts: Vec<String> = report.attempts.iter().map(format_attempt).collect();
        output.push_str(&format!("{}  attempts: {}\n", pad, attempts.join(", ")));
    } else if report.status != ReportStatus::Resolved && report.status != ReportStatus::Detached {
        output.push_str(&format!("{}  attempts: none applicable\n", pad));
    }

    if let Some(ancestor) = &report.ancestor {
        output.push_str(&format!("{}  ancestor:\n", pad));
        write_report(output, ancestor, depth + 2);
    }
}

fn format_node(node: &NodeReport) -> String {
    match &node.path {
        Some(path) => format!("[{}] {}", node.id, path),
        None => format!("[{}]", node.id),
    }
}

fn format_attempt(attempt: &Attempt) -> String {
    if attempt.anchored {
        format!("{}={} (anchored)", attempt.strategy, attempt.candidates)
    } else {
        format!("{}={}", attempt.strategy, attempt.candidates)
    }
}
