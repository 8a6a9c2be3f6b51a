//! Hierarchy of renderable nodes
//!
//! Nodes live in a [`SlotMap`] owned by the [`Scene`]; parent and children are
//! stored as [`NodeId`]s. Every write to a node's local transform recomputes
//! its world transform and then, depth first, the world transform of its whole
//! subtree before the call returns.
//!
//! ELI5:
//! ┌──────────────── Write Propagation ────────────────────┐
//! │  set_opacity(parent, 1.0)                             │
//! │    └─► world(parent)   = compose(local, IDENTITY)     │
//! │          ├─► world(child_a) = compose(local, parent)  │
//! │          │     └─► world(grandchild) = ...            │
//! │          └─► world(child_b) = compose(local, parent)  │
//! └───────────────────────────────────────────────────────┘
pub mod pool;
pub mod transform;

pub use self::pool::Pool;
pub use self::transform::{compute_world, rotate_point, Local, World};

use crate::error::SceneError;
use crate::renderer::Surface;
use crate::vector::Vector2;
use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Handle to a node inside a [`Scene`]
    pub struct NodeId;
}

/// Per-node draw hook, called in node space after the node's transforms are applied
pub trait Draw {
    fn draw(&self, surface: &mut dyn Surface, local: &Local);
}

/// Remaining frames a node stays alive for
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Ttl {
    #[default]
    Infinite,
    Frames(i64),
}

impl Ttl {
    pub fn is_alive(self) -> bool {
        match self {
            Ttl::Infinite => true,
            Ttl::Frames(frames) => frames > 0,
        }
    }

    /// one frame less, keeps counting below zero
    fn tick(self) -> Ttl {
        match self {
            Ttl::Infinite => Ttl::Infinite,
            Ttl::Frames(frames) => Ttl::Frames(frames - 1),
        }
    }
}

/// Initial attributes for a node, anything not set keeps its default
///
/// ```ignore
/// let id = scene.spawn(NodeProps {
///     position: Vector2::new(100.0, 80.0),
///     width: 20.0,
///     height: 40.0,
///     velocity: Vector2::new(2.0, 0.0),
///     ..NodeProps::default()
/// });
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NodeProps {
    pub position: Vector2,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub opacity: f64,
    pub anchor: (f64, f64),
    pub velocity: Vector2,
    pub acceleration: Vector2,
    pub ttl: Ttl,
}

impl Default for NodeProps {
    fn default() -> Self {
        let local = Local::default();
        NodeProps {
            position: local.position,
            width: local.width,
            height: local.height,
            rotation: local.rotation,
            scale_x: local.scale_x,
            scale_y: local.scale_y,
            opacity: local.opacity,
            anchor: local.anchor,
            velocity: Vector2::ZERO,
            acceleration: Vector2::ZERO,
            ttl: Ttl::Infinite,
        }
    }
}

impl NodeProps {
    fn local(&self) -> Local {
        Local {
            position: self.position,
            width: self.width,
            height: self.height,
            rotation: self.rotation,
            scale_x: self.scale_x,
            scale_y: self.scale_y,
            opacity: self.opacity.clamp(0.0, 1.0),
            anchor: self.anchor,
        }
    }
}

struct Node {
    local: Local,
    velocity: Vector2,
    acceleration: Vector2,
    ttl: Ttl,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    world: World,
    draw: Option<Box<dyn Draw>>,
}

impl Node {
    fn new(props: &NodeProps) -> Self {
        let local = props.local();
        Node {
            local,
            velocity: props.velocity,
            acceleration: props.acceleration,
            ttl: props.ttl,
            parent: None,
            children: Vec::new(),
            world: compute_world(&local, None),
            draw: None,
        }
    }
}

/// Owner of every node and of the parent/child links between them
#[derive(Default)]
pub struct Scene {
    nodes: SlotMap<NodeId, Node>,
    /// nodes without a parent, in the order they became roots
    roots: Vec<NodeId>,
}

impl Scene {
    pub fn new() -> Self {
        Scene::default()
    }

    // ==================== Lifecycle ====================

    /// Create a root node from `props`
    pub fn spawn(&mut self, props: NodeProps) -> NodeId {
        let id = self.nodes.insert(Node::new(&props));
        self.roots.push(id);
        id
    }

    /// Create a root node with a draw hook attached
    pub fn spawn_with(&mut self, props: NodeProps, draw: impl Draw + 'static) -> NodeId {
        let id = self.spawn(props);
        if let Some(node) = self.nodes.get_mut(id) {
            node.draw = Some(Box::new(draw));
        }
        id
    }

    /// Reset every attribute of `id` from `props`, keeping its identity,
    /// parent, children and draw hook
    pub fn reinit(&mut self, id: NodeId, props: NodeProps) -> Result<(), SceneError> {
        let node = self.node_mut(id)?;
        node.local = props.local();
        node.velocity = props.velocity;
        node.acceleration = props.acceleration;
        node.ttl = props.ttl;
        self.propagate(id);
        Ok(())
    }

    /// Remove `id` and its whole subtree from the scene
    pub fn destroy(&mut self, id: NodeId) -> Result<(), SceneError> {
        match self.node(id)?.parent {
            Some(parent) => {
                if let Some(parent) = self.nodes.get_mut(parent) {
                    parent.children.retain(|child| *child != id);
                }
            }
            None => self.roots.retain(|root| *root != id),
        }
        for doomed in self.subtree(id) {
            self.nodes.remove(doomed);
        }
        Ok(())
    }

    // ==================== Queries ====================

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn local(&self, id: NodeId) -> Option<&Local> {
        self.nodes.get(id).map(|node| &node.local)
    }

    pub fn world(&self, id: NodeId) -> Option<World> {
        self.nodes.get(id).map(|node| node.world)
    }

    pub fn velocity(&self, id: NodeId) -> Option<Vector2> {
        self.nodes.get(id).map(|node| node.velocity)
    }

    pub fn acceleration(&self, id: NodeId) -> Option<Vector2> {
        self.nodes.get(id).map(|node| node.acceleration)
    }

    pub fn ttl(&self, id: NodeId) -> Option<Ttl> {
        self.nodes.get(id).map(|node| node.ttl)
    }

    /// false for nodes that are not in the scene
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id)
            .map(|node| node.ttl.is_alive())
            .unwrap_or(false)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// `ancestor` is `id` or one of its parents
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    // ==================== Local writes ====================

    /// Single entry point for local transform writes
    /// - opacity is clamped to [0, 1] after `edit` runs
    /// - world transforms of `id` and its subtree are current on return
    pub fn set_local(
        &mut self,
        id: NodeId,
        edit: impl FnOnce(&mut Local),
    ) -> Result<(), SceneError> {
        let node = self.node_mut(id)?;
        edit(&mut node.local);
        node.local.opacity = node.local.opacity.clamp(0.0, 1.0);
        self.propagate(id);
        Ok(())
    }

    pub fn set_position(&mut self, id: NodeId, x: f64, y: f64) -> Result<(), SceneError> {
        self.set_local(id, |local| {
            local.position.set_x(x);
            local.position.set_y(y);
        })
    }

    pub fn set_x(&mut self, id: NodeId, x: f64) -> Result<(), SceneError> {
        self.set_local(id, |local| local.position.set_x(x))
    }

    pub fn set_y(&mut self, id: NodeId, y: f64) -> Result<(), SceneError> {
        self.set_local(id, |local| local.position.set_y(y))
    }

    pub fn set_size(&mut self, id: NodeId, width: f64, height: f64) -> Result<(), SceneError> {
        self.set_local(id, |local| {
            local.width = width;
            local.height = height;
        })
    }

    pub fn set_rotation(&mut self, id: NodeId, rotation: f64) -> Result<(), SceneError> {
        self.set_local(id, |local| local.rotation = rotation)
    }

    pub fn set_scale(&mut self, id: NodeId, x: f64, y: f64) -> Result<(), SceneError> {
        self.set_local(id, |local| {
            local.scale_x = x;
            local.scale_y = y;
        })
    }

    pub fn set_opacity(&mut self, id: NodeId, opacity: f64) -> Result<(), SceneError> {
        self.set_local(id, |local| local.opacity = opacity)
    }

    pub fn set_anchor(&mut self, id: NodeId, x: f64, y: f64) -> Result<(), SceneError> {
        self.set_local(id, |local| local.anchor = (x, y))
    }

    // kinematics don't feed the world transform, so no propagation here

    pub fn set_velocity(&mut self, id: NodeId, velocity: Vector2) -> Result<(), SceneError> {
        self.node_mut(id)?.velocity = velocity;
        Ok(())
    }

    pub fn set_acceleration(
        &mut self,
        id: NodeId,
        acceleration: Vector2,
    ) -> Result<(), SceneError> {
        self.node_mut(id)?.acceleration = acceleration;
        Ok(())
    }

    pub fn set_ttl(&mut self, id: NodeId, ttl: Ttl) -> Result<(), SceneError> {
        self.node_mut(id)?.ttl = ttl;
        Ok(())
    }

    pub fn set_draw(&mut self, id: NodeId, draw: Box<dyn Draw>) -> Result<(), SceneError> {
        self.node_mut(id)?.draw = Some(draw);
        Ok(())
    }

    // ==================== Hierarchy ====================

    /// Attach `child` as the last child of `parent`
    /// - a child attached elsewhere is moved, one already under `parent` stays put
    /// - the child's subtree is recomputed against its new parent
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        self.node(parent)?;
        let previous = self.node(child)?.parent;
        if self.is_ancestor(child, parent) {
            return Err(SceneError::WouldCycle { parent, child });
        }

        match previous {
            Some(previous) if previous == parent => {}
            Some(previous) => {
                if let Some(previous) = self.nodes.get_mut(previous) {
                    previous.children.retain(|id| *id != child);
                }
                self.link(parent, child);
            }
            None => {
                self.roots.retain(|id| *id != child);
                self.link(parent, child);
            }
        }

        self.propagate(child);
        Ok(())
    }

    /// Attach every node in `children`, in order, stopping at the first error
    pub fn add_children(
        &mut self,
        parent: NodeId,
        children: impl IntoIterator<Item = NodeId>,
    ) -> Result<(), SceneError> {
        children
            .into_iter()
            .try_for_each(|child| self.add_child(parent, child))
    }

    /// Detach `child` from `parent`, it becomes a root again
    /// # Returns
    /// * `Ok(true)` - child was detached and recomputed as a root
    /// * `Ok(false)` - child was not under `parent`, nothing changed
    /// * `Err` - `parent` is not in the scene
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<bool, SceneError> {
        let siblings = &mut self.node_mut(parent)?.children;
        let Some(index) = siblings.iter().position(|id| *id == child) else {
            return Ok(false);
        };
        siblings.remove(index);

        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = None;
            self.roots.push(child);
            self.propagate(child);
        }
        Ok(true)
    }

    /// Replace every child of `parent` with `children`
    pub fn set_children(
        &mut self,
        parent: NodeId,
        children: impl IntoIterator<Item = NodeId>,
    ) -> Result<(), SceneError> {
        let current = self.node(parent)?.children.clone();
        for child in current {
            self.remove_child(parent, child)?;
        }
        self.add_children(parent, children)
    }

    // ==================== Frame work ====================

    /// Move `id` by one step
    /// - velocity += acceleration, position += velocity (both scaled by `dt` when given)
    /// - ttl drops by exactly one, whatever `dt` is
    pub fn advance(&mut self, id: NodeId, dt: Option<f64>) -> Result<(), SceneError> {
        let node = self.node_mut(id)?;

        let acceleration = match dt {
            Some(dt) => node.acceleration.scale(dt),
            None => node.acceleration,
        };
        node.velocity = node.velocity.add(&acceleration);

        let velocity = match dt {
            Some(dt) => node.velocity.scale(dt),
            None => node.velocity,
        };
        node.local.position = node.local.position.add(&velocity);
        node.ttl = node.ttl.tick();

        self.propagate(id);
        Ok(())
    }

    /// Advance `id` and then every node below it, parents before children
    pub fn update(&mut self, id: NodeId, dt: Option<f64>) -> Result<(), SceneError> {
        self.node(id)?;
        for node in self.subtree(id) {
            self.advance(node, dt)?;
        }
        Ok(())
    }

    pub fn update_roots(&mut self, dt: Option<f64>) -> Result<(), SceneError> {
        for root in self.roots.clone() {
            self.update(root, dt)?;
        }
        Ok(())
    }

    /// Draw `id` and its subtree, pre-order
    ///
    /// TABLE:
    /// ┌────┬──────────────────────────────────────────────┐
    /// │ 1  │ save                                         │
    /// │ 2  │ translate(x, y)          skipped at (0, 0)   │
    /// │ 3  │ rotate(rotation)         skipped at 0        │
    /// │ 4  │ scale(sx, sy)            skipped at (1, 1)   │
    /// │ 5  │ translate(anchor offset) skipped at (0, 0)   │
    /// │ 6  │ opacity + draw hook                          │
    /// │ 7  │ undo anchor offset                           │
    /// │ 8  │ children, in insertion order                 │
    /// │ 9  │ restore                                      │
    /// └────┴──────────────────────────────────────────────┘
    pub fn render(&self, id: NodeId, surface: &mut dyn Surface) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let local = &node.local;

        surface.save();

        if local.x() != 0.0 || local.y() != 0.0 {
            surface.translate(local.x(), local.y());
        }
        if local.rotation != 0.0 {
            surface.rotate(local.rotation);
        }
        if local.scale_x != 1.0 || local.scale_y != 1.0 {
            surface.scale(local.scale_x, local.scale_y);
        }

        let (anchor_x, anchor_y) = local.anchor_offset();
        let anchored = anchor_x != 0.0 || anchor_y != 0.0;
        if anchored {
            surface.translate(anchor_x, anchor_y);
        }

        surface.set_opacity(node.world.opacity);
        if let Some(draw) = &node.draw {
            draw.draw(surface, local);
        }

        if anchored {
            surface.translate(-anchor_x, -anchor_y);
        }

        for child in &node.children {
            self.render(*child, surface);
        }

        surface.restore();
    }

    pub fn render_roots(&self, surface: &mut dyn Surface) {
        for root in &self.roots {
            self.render(*root, surface);
        }
    }

    // ==================== Internals ====================

    fn node(&self, id: NodeId) -> Result<&Node, SceneError> {
        self.nodes.get(id).ok_or(SceneError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, SceneError> {
        self.nodes.get_mut(id).ok_or(SceneError::NodeNotFound(id))
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(child);
        }
    }

    /// `id` followed by its descendants, depth first pre-order
    fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get(current) {
                order.push(current);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        order
    }

    /// Recompute the world transform of `id` from its parent's, then of every descendant
    fn propagate(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let parent_world = self
                .parent(current)
                .and_then(|parent| self.nodes.get(parent))
                .map(|parent| parent.world);
            if let Some(node) = self.nodes.get_mut(current) {
                node.world = compute_world(&node.local, parent_world.as_ref());
                stack.extend(node.children.iter().rev().copied());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprite::Sprite;
    use crate::testing::{RecordingSurface, SurfaceCall};
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn sized(x: f64, y: f64, width: f64, height: f64) -> NodeProps {
        NodeProps {
            position: Vector2::new(x, y),
            width,
            height,
            ..NodeProps::default()
        }
    }

    #[test]
    fn root_world_matches_local_attributes() {
        let mut scene = Scene::new();
        let id = scene.spawn(NodeProps {
            anchor: (0.5, 0.5),
            ..sized(10.0, 10.0, 20.0, 20.0)
        });
        assert_eq!(
            scene.world(id),
            Some(World {
                x: 10.0,
                y: 10.0,
                width: 20.0,
                height: 20.0,
                opacity: 1.0,
                rotation: 0.0,
                scale_x: 1.0,
                scale_y: 1.0,
            })
        );
    }

    #[test]
    fn opacity_write_on_parent_reaches_child() {
        let mut scene = Scene::new();
        let parent = scene.spawn(NodeProps {
            opacity: 0.5,
            ..NodeProps::default()
        });
        let child = scene.spawn(NodeProps {
            opacity: 0.5,
            ..NodeProps::default()
        });
        scene.add_child(parent, child).unwrap();
        assert_relative_eq!(scene.world(child).unwrap().opacity, 0.25);

        scene.set_opacity(parent, 1.0).unwrap();
        assert_relative_eq!(scene.world(child).unwrap().opacity, 0.5);
    }

    #[test]
    fn opacity_is_clamped() {
        let mut scene = Scene::new();
        let id = scene.spawn(NodeProps {
            opacity: 3.0,
            ..NodeProps::default()
        });
        assert_eq!(scene.local(id).unwrap().opacity, 1.0);
        scene.set_opacity(id, -0.5).unwrap();
        assert_eq!(scene.local(id).unwrap().opacity, 0.0);
    }

    #[test]
    fn grandchildren_follow_moves_and_rotation() {
        let mut scene = Scene::new();
        let root = scene.spawn(sized(100.0, 100.0, 10.0, 10.0));
        let arm = scene.spawn(sized(10.0, 0.0, 10.0, 10.0));
        let hand = scene.spawn(sized(5.0, 0.0, 2.0, 2.0));
        scene.add_child(root, arm).unwrap();
        scene.add_child(arm, hand).unwrap();
        assert_relative_eq!(scene.world(hand).unwrap().x, 115.0);

        scene.set_rotation(root, FRAC_PI_2).unwrap();
        let hand_world = scene.world(hand).unwrap();
        assert_relative_eq!(hand_world.x, 100.0, epsilon = 1e-9);
        assert_relative_eq!(hand_world.y, 115.0, epsilon = 1e-9);
        assert_relative_eq!(hand_world.rotation, FRAC_PI_2);

        scene.set_scale(root, 2.0, 2.0).unwrap();
        let hand_world = scene.world(hand).unwrap();
        assert_relative_eq!(hand_world.y, 130.0, epsilon = 1e-9);
        assert_relative_eq!(hand_world.width, 4.0);
    }

    #[test]
    fn detached_child_computes_as_root() {
        let mut scene = Scene::new();
        let parent = scene.spawn(NodeProps {
            scale_x: 3.0,
            opacity: 0.2,
            ..sized(50.0, 50.0, 10.0, 10.0)
        });
        let props = NodeProps {
            opacity: 0.5,
            ..sized(5.0, 5.0, 4.0, 4.0)
        };
        let child = scene.spawn(props);
        let alone = scene.spawn(props);
        scene.add_child(parent, child).unwrap();
        assert_ne!(scene.world(child), scene.world(alone));

        assert_eq!(scene.remove_child(parent, child), Ok(true));
        assert_eq!(scene.world(child), scene.world(alone));
        assert_eq!(scene.parent(child), None);
        assert!(scene.roots().contains(&child));
        assert!(scene.children(parent).is_empty());
    }

    #[test]
    fn remove_child_reports_missing() {
        let mut scene = Scene::new();
        let parent = scene.spawn(NodeProps::default());
        let stranger = scene.spawn(NodeProps::default());
        assert_eq!(scene.remove_child(parent, stranger), Ok(false));
        assert_eq!(scene.roots(), &[parent, stranger]);
    }

    #[test]
    fn add_child_moves_between_parents_without_duplicates() {
        let mut scene = Scene::new();
        let a = scene.spawn(sized(10.0, 0.0, 0.0, 0.0));
        let b = scene.spawn(sized(0.0, 10.0, 0.0, 0.0));
        let child = scene.spawn(NodeProps::default());

        scene.add_children(a, [child, child]).unwrap();
        assert_eq!(scene.children(a), &[child]);

        scene.add_child(b, child).unwrap();
        assert!(scene.children(a).is_empty());
        assert_eq!(scene.children(b), &[child]);
        assert_eq!(scene.parent(child), Some(b));
        assert_eq!(scene.world(child).unwrap().y, 10.0);
        assert_eq!(scene.roots(), &[a, b]);
    }

    #[test]
    fn add_child_rejects_cycles() {
        let mut scene = Scene::new();
        let a = scene.spawn(NodeProps::default());
        let b = scene.spawn(NodeProps::default());
        scene.add_child(a, b).unwrap();
        assert_eq!(
            scene.add_child(b, a),
            Err(SceneError::WouldCycle {
                parent: b,
                child: a
            })
        );
        assert_eq!(
            scene.add_child(a, a),
            Err(SceneError::WouldCycle {
                parent: a,
                child: a
            })
        );
    }

    #[test]
    fn set_children_replaces_list() {
        let mut scene = Scene::new();
        let parent = scene.spawn(NodeProps::default());
        let old = scene.spawn(NodeProps::default());
        let new_a = scene.spawn(NodeProps::default());
        let new_b = scene.spawn(NodeProps::default());
        scene.add_child(parent, old).unwrap();
        scene.set_children(parent, vec![new_a, new_b]).unwrap();
        assert_eq!(scene.children(parent), &[new_a, new_b]);
        assert_eq!(scene.parent(old), None);
    }

    #[test]
    fn destroy_removes_subtree() {
        let mut scene = Scene::new();
        let root = scene.spawn(NodeProps::default());
        let branch = scene.spawn(NodeProps::default());
        let leaf = scene.spawn(NodeProps::default());
        scene.add_child(root, branch).unwrap();
        scene.add_child(branch, leaf).unwrap();

        scene.destroy(branch).unwrap();
        assert!(!scene.contains(branch));
        assert!(!scene.contains(leaf));
        assert!(scene.children(root).is_empty());
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.destroy(leaf), Err(SceneError::NodeNotFound(leaf)));
    }

    #[test]
    fn ttl_counts_down_per_advance() {
        let mut scene = Scene::new();
        let id = scene.spawn(NodeProps {
            ttl: Ttl::Frames(3),
            ..NodeProps::default()
        });
        let mut alive = Vec::new();
        for _ in 0..3 {
            scene.advance(id, None).unwrap();
            alive.push(scene.is_alive(id));
        }
        assert_eq!(alive, vec![true, true, false]);
        assert_eq!(scene.ttl(id), Some(Ttl::Frames(0)));
    }

    #[test]
    fn ttl_ignores_dt() {
        let mut scene = Scene::new();
        let id = scene.spawn(NodeProps {
            ttl: Ttl::Frames(2),
            ..NodeProps::default()
        });
        scene.advance(id, Some(0.5)).unwrap();
        assert_eq!(scene.ttl(id), Some(Ttl::Frames(1)));
        let forever = scene.spawn(NodeProps::default());
        scene.advance(forever, Some(0.5)).unwrap();
        assert!(scene.is_alive(forever));
    }

    #[test]
    fn advance_integrates_and_propagates() {
        let mut scene = Scene::new();
        let ship = scene.spawn(NodeProps {
            velocity: Vector2::new(2.0, 0.0),
            acceleration: Vector2::new(0.0, 1.0),
            ..NodeProps::default()
        });
        let flame = scene.spawn(sized(-5.0, 0.0, 0.0, 0.0));
        scene.add_child(ship, flame).unwrap();

        scene.advance(ship, None).unwrap();
        assert_eq!(scene.velocity(ship), Some(Vector2::new(2.0, 1.0)));
        assert_eq!(scene.local(ship).unwrap().position, Vector2::new(2.0, 1.0));
        assert_eq!(scene.world(flame).unwrap().x, -3.0);

        scene.advance(ship, Some(0.5)).unwrap();
        // velocity (2, 1) + (0, 0.5), moved by half of (2, 1.5)
        assert_relative_eq!(scene.local(ship).unwrap().x(), 3.0);
        assert_relative_eq!(scene.local(ship).unwrap().y(), 1.75);
    }

    #[test]
    fn clamped_position_stays_in_bounds() {
        let mut position = Vector2::new(8.0, 0.0);
        position.clamp(0.0, 0.0, 10.0, 10.0);
        let mut scene = Scene::new();
        let id = scene.spawn(NodeProps {
            position,
            velocity: Vector2::new(5.0, 0.0),
            ..NodeProps::default()
        });
        scene.advance(id, None).unwrap();
        scene.advance(id, None).unwrap();
        assert_eq!(scene.local(id).unwrap().x(), 10.0);
    }

    #[test]
    fn update_walks_children_after_parent() {
        let mut scene = Scene::new();
        let moving = NodeProps {
            velocity: Vector2::new(1.0, 0.0),
            ttl: Ttl::Frames(5),
            ..NodeProps::default()
        };
        let parent = scene.spawn(moving);
        let child = scene.spawn(moving);
        scene.add_child(parent, child).unwrap();

        scene.update_roots(None).unwrap();
        assert_eq!(scene.local(child).unwrap().x(), 1.0);
        assert_eq!(scene.world(child).unwrap().x, 2.0);
        assert_eq!(scene.ttl(child), Some(Ttl::Frames(4)));
    }

    #[test]
    fn reinit_keeps_identity_and_links() {
        let mut scene = Scene::new();
        let parent = scene.spawn(sized(10.0, 10.0, 0.0, 0.0));
        let child = scene.spawn(NodeProps {
            ttl: Ttl::Frames(0),
            ..NodeProps::default()
        });
        scene.add_child(parent, child).unwrap();

        scene
            .reinit(
                child,
                NodeProps {
                    ttl: Ttl::Frames(10),
                    ..sized(1.0, 1.0, 3.0, 3.0)
                },
            )
            .unwrap();
        assert!(scene.is_alive(child));
        assert_eq!(scene.parent(child), Some(parent));
        assert_eq!(scene.world(child).unwrap().x, 11.0);
    }

    #[test]
    fn render_mirrors_transform_order() {
        let mut scene = Scene::new();
        let parent = scene.spawn_with(
            NodeProps {
                rotation: 0.5,
                anchor: (0.5, 0.5),
                ..sized(10.0, 20.0, 4.0, 2.0)
            },
            Sprite::new("red"),
        );
        let child = scene.spawn(NodeProps {
            scale_x: 2.0,
            opacity: 0.5,
            ..NodeProps::default()
        });
        scene.add_child(parent, child).unwrap();

        let mut surface = RecordingSurface::default();
        scene.render_roots(&mut surface);

        use SurfaceCall::*;
        assert_eq!(
            surface.calls,
            vec![
                Save,
                Translate(10.0, 20.0),
                Rotate(0.5),
                Translate(-2.0, -1.0),
                Opacity(1.0),
                FillRect(crate::renderer::Rect::new(0.0, 0.0, 4.0, 2.0), "red".into()),
                Translate(2.0, 1.0),
                Save,
                Scale(2.0, 1.0),
                Opacity(0.5),
                Restore,
                Restore,
            ]
        );
    }

    #[test]
    fn missing_nodes_are_reported() {
        let mut scene = Scene::new();
        let id = scene.spawn(NodeProps::default());
        scene.destroy(id).unwrap();
        assert_eq!(scene.set_x(id, 1.0), Err(SceneError::NodeNotFound(id)));
        assert_eq!(scene.world(id), None);
        assert!(!scene.is_alive(id));

        let mut surface = RecordingSurface::default();
        scene.render(id, &mut surface);
        assert!(surface.calls.is_empty());
    }
}
