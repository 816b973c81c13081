use thiserror::Error;

use crate::capture::{CaptureAgent, CapturedContext};
use crate::dom::{NodeId, Page};
use crate::geometry::Point;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("no element found at ({x}, {y})")]
    NoTarget { x: f64, y: f64 },
    #[error("captured context no longer matches elected timestamp {expected}")]
    StaleElection { expected: u64 },
}

impl ResolveError {
    /// Short machine-readable reason used in frame responses.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NoTarget { .. } => "no-target",
            Self::StaleElection { .. } => "stale-election",
        }
    }
}

pub type ResolveResult<T> = std::result::Result<T, ResolveError>;

/// Elements from the interaction target up to the frame's root, innermost
/// first. Snapshotted once; never re-walked while the palette is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncestorChain {
    elements: Vec<NodeId>,
}

impl AncestorChain {
    pub fn elements(&self) -> &[NodeId] {
        &self.elements
    }

    pub fn target(&self) -> Option<NodeId> {
        self.elements.first().copied()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.elements.iter().copied()
    }
}

/// Confirms the frame's own capture still backs the elected timestamp.
pub fn revalidate(
    agent: &CaptureAgent,
    elected_timestamp: u64,
    now_ms: u64,
) -> ResolveResult<CapturedContext> {
    agent
        .fresh_context(now_ms)
        .filter(|context| context.timestamp == elected_timestamp)
        .ok_or(ResolveError::StaleElection {
            expected: elected_timestamp,
        })
}

pub fn resolve_target<P: Page + ?Sized>(page: &P, point: Point) -> ResolveResult<NodeId> {
    page.element_at(point).ok_or(ResolveError::NoTarget {
        x: point.x,
        y: point.y,
    })
}

pub fn build_ancestor_chain<P: Page + ?Sized>(page: &P, target: NodeId) -> AncestorChain {
    let root = page.root();
    let mut elements = Vec::new();
    let mut current = Some(target);
    while let Some(node) = current {
        if elements.contains(&node) {
            tracing::warn!(?node, "cycle in parent links; stopping ancestor walk");
            break;
        }
        elements.push(node);
        if Some(node) == root {
            break;
        }
        current = page.parent(node);
    }

    if let Some(root) = root {
        if elements.last() != Some(&root) {
            tracing::debug!(?target, "target not connected to root; appending root");
            elements.push(root);
        }
    }
    AncestorChain { elements }
}

/// Hit-tests `point` and snapshots the chain above the hit.
pub fn resolve_chain<P: Page + ?Sized>(page: &P, point: Point) -> ResolveResult<AncestorChain> {
    let target = resolve_target(page, point)?;
    Ok(build_ancestor_chain(page, target))
}
