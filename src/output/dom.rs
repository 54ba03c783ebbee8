//! Incremental DOM reconciliation for a live view
//!
//! The reconciler remembers what it has mounted, keyed by node id, and turns
//! each new (tree, geometry) pair into the smallest list of mutations that
//! brings the view up to date. A layout switch moves existing elements with
//! `Transition` patches instead of removing and recreating them.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::collapse::CollapseController;
use crate::error::RenderError;
use crate::layout::{Geometry, GeometryMap};
use crate::tree::{Node, NodeId, NodeKind};

/// One mutation for the presentation layer to apply, in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DomPatch {
    Create {
        id: NodeId,
        parent: Option<NodeId>,
        label: String,
        kind: NodeKind,
        geometry: Geometry,
    },
    /// Move an existing element; the view animates between the two.
    Transition {
        id: NodeId,
        from: Geometry,
        to: Geometry,
    },
    Remove {
        id: NodeId,
    },
    CreateEdge {
        source: NodeId,
        target: NodeId,
    },
    RemoveEdge {
        source: NodeId,
        target: NodeId,
    },
    /// Show or hide a node together with the edge leading into it.
    SetVisibility {
        id: NodeId,
        visible: bool,
    },
}

/// Tracks the mounted view between renders.
#[derive(Debug, Clone, Default)]
pub struct DomReconciler {
    mounted: HashMap<NodeId, Geometry>,
    /// Mounted ids in pre-order, for deterministic visibility patches.
    order: Vec<NodeId>,
    edges: HashSet<(NodeId, NodeId)>,
    hidden: HashSet<NodeId>,
}

impl DomReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of mounted node elements.
    pub fn mounted_count(&self) -> usize {
        self.mounted.len()
    }

    /// Patches that turn the mounted view into `root` laid out by `geometry`.
    ///
    /// Order: stale edges and nodes are removed first (sorted by id), then
    /// nodes are created or moved in pre-order, then new edges are created.
    /// Nothing is mounted if any node lacks geometry.
    pub fn reconcile(
        &mut self,
        root: &Node,
        geometry: &GeometryMap,
    ) -> Result<Vec<DomPatch>, RenderError> {
        let mut next: Vec<(&Node, Option<&NodeId>, Geometry)> = Vec::new();
        let mut parents: HashMap<&NodeId, &NodeId> = HashMap::new();
        for node in root.walk() {
            for child in node.children() {
                parents.insert(&child.id, &node.id);
            }
            let placed = geometry
                .get(&node.id)
                .ok_or_else(|| RenderError::MissingGeometry {
                    id: node.id.to_string(),
                    path: node.path.clone(),
                })?;
            next.push((node, parents.get(&node.id).copied(), *placed));
        }

        let next_ids: HashSet<&NodeId> = next.iter().map(|(n, _, _)| &n.id).collect();
        let next_edges: Vec<(NodeId, NodeId)> = next
            .iter()
            .filter_map(|(n, parent, _)| parent.map(|p| (p.clone(), n.id.clone())))
            .collect();
        let edge_set: HashSet<&(NodeId, NodeId)> = next_edges.iter().collect();

        let mut patches = Vec::new();

        let mut stale_edges: Vec<&(NodeId, NodeId)> =
            self.edges.iter().filter(|e| !edge_set.contains(e)).collect();
        stale_edges.sort();
        patches.extend(stale_edges.into_iter().map(|(source, target)| {
            DomPatch::RemoveEdge {
                source: source.clone(),
                target: target.clone(),
            }
        }));

        let mut stale: Vec<&NodeId> = self
            .mounted
            .keys()
            .filter(|id| !next_ids.contains(id))
            .collect();
        stale.sort();
        patches.extend(stale.into_iter().map(|id| DomPatch::Remove { id: id.clone() }));

        for (node, parent, to) in &next {
            match self.mounted.get(&node.id) {
                Some(from) if from == to => {}
                Some(from) => patches.push(DomPatch::Transition {
                    id: node.id.clone(),
                    from: *from,
                    to: *to,
                }),
                None => patches.push(DomPatch::Create {
                    id: node.id.clone(),
                    parent: parent.cloned(),
                    label: node.name.clone(),
                    kind: node.kind,
                    geometry: *to,
                }),
            }
        }

        patches.extend(
            next_edges
                .iter()
                .filter(|e| !self.edges.contains(*e))
                .map(|(source, target)| DomPatch::CreateEdge {
                    source: source.clone(),
                    target: target.clone(),
                }),
        );

        self.mounted = next
            .iter()
            .map(|(n, _, g)| (n.id.clone(), *g))
            .collect();
        self.order = next.iter().map(|(n, _, _)| n.id.clone()).collect();
        self.hidden.retain(|id| next_ids.contains(id));
        self.edges = next_edges.into_iter().collect();

        debug!(patches = patches.len(), strategy = %geometry.strategy, "reconciled view");
        Ok(patches)
    }

    /// Visibility patches for every mounted node whose visibility under
    /// `collapse` differs from what the view currently shows.
    pub fn sync_visibility(&mut self, collapse: &CollapseController) -> Vec<DomPatch> {
        let mut patches = Vec::new();
        for id in &self.order {
            let visible = collapse.is_visible(id);
            let shown = !self.hidden.contains(id);
            if visible == shown {
                continue;
            }
            if visible {
                self.hidden.remove(id);
            } else {
                self.hidden.insert(id.clone());
            }
            patches.push(DomPatch::SetVisibility {
                id: id.clone(),
                visible,
            });
        }
        patches
    }
}
