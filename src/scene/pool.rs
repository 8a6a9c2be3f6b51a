use super::{NodeId, NodeProps, Scene};
use crate::error::SceneError;
use crate::renderer::Surface;

/// Bounded set of reusable nodes (bullets, particles, ...)
/// - a node whose ttl ran out is handed back out through [`Scene::reinit`]
/// - nodes with an infinite ttl never die, so they are never reused
///
/// ELI5:
/// ┌──────────────── get(props) ─────────────────────┐
/// │  dead node in pool?   → reinit it, return it    │
/// │  room left?           → spawn new, return it    │
/// │  otherwise            → None                    │
/// └─────────────────────────────────────────────────┘
#[derive(Debug)]
pub struct Pool {
    nodes: Vec<NodeId>,
    capacity: usize,
}

impl Pool {
    pub fn new(capacity: usize) -> Self {
        Pool {
            nodes: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// nodes created so far, dead or alive
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Hand out a node initialized from `props`
    pub fn get(&mut self, scene: &mut Scene, props: NodeProps) -> Option<NodeId> {
        // forget nodes somebody destroyed behind our back
        self.nodes.retain(|id| scene.contains(*id));

        if let Some(&id) = self.nodes.iter().find(|id| !scene.is_alive(**id)) {
            scene.reinit(id, props).ok()?;
            return Some(id);
        }

        if self.nodes.len() < self.capacity {
            let id = scene.spawn(props);
            self.nodes.push(id);
            return Some(id);
        }

        None
    }

    pub fn alive(&self, scene: &Scene) -> Vec<NodeId> {
        self.nodes
            .iter()
            .copied()
            .filter(|id| scene.is_alive(*id))
            .collect()
    }

    /// Update every live node (and its children)
    pub fn update(&self, scene: &mut Scene, dt: Option<f64>) -> Result<(), SceneError> {
        for id in self.alive(scene) {
            scene.update(id, dt)?;
        }
        Ok(())
    }

    /// Render every live node (and its children)
    pub fn render(&self, scene: &Scene, surface: &mut dyn Surface) {
        for id in self.alive(scene) {
            scene.render(id, surface);
        }
    }

    /// Destroy every pooled node
    pub fn clear(&mut self, scene: &mut Scene) {
        for id in self.nodes.drain(..) {
            // already gone is fine
            let _ = scene.destroy(id);
        }
    }
}
