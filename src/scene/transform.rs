use crate::vector::Vector2;

/// Rotate `(x, y)` around the origin by `angle` radians
pub fn rotate_point(x: f64, y: f64, angle: f64) -> (f64, f64) {
    let (sin, cos) = angle.sin_cos();
    (x * cos - y * sin, x * sin + y * cos)
}

/// Transform state owned by a node, relative to its parent
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Local {
    pub position: Vector2,
    pub width: f64,
    pub height: f64,
    /// radians
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// always within [0, 1]
    pub opacity: f64,
    /// (0, 0) is top left, (1, 1) bottom right
    pub anchor: (f64, f64),
}

impl Default for Local {
    fn default() -> Self {
        Local {
            position: Vector2::ZERO,
            width: 0.0,
            height: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            opacity: 1.0,
            anchor: (0.0, 0.0),
        }
    }
}

impl Local {
    pub fn x(&self) -> f64 {
        self.position.x()
    }

    pub fn y(&self) -> f64 {
        self.position.y()
    }

    /// Offset applied so the anchor point lands on `position`
    pub fn anchor_offset(&self) -> (f64, f64) {
        (-self.width * self.anchor.0, -self.height * self.anchor.1)
    }
}

/// World space transform, derived from [`Local`] and every ancestor
/// - never edited by hand, see [`compute_world`]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct World {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub opacity: f64,
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl World {
    /// What a node without a parent composes against
    pub const IDENTITY: World = World {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
        opacity: 1.0,
        rotation: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
    };
}

/// Compose a local transform with its parent's (already current) world
///
/// TABLE:
/// ┌────────────────┬────────────────────────────────────────────────────┐
/// │ World field    │ Composition                                        │
/// ├────────────────┼────────────────────────────────────────────────────┤
/// │ scale_x/y      │ parent.scale * local.scale                         │
/// │ x, y           │ rotate(local.pos * parent.scale, parent.rotation)  │
/// │                │   + parent.pos                                     │
/// │ width, height  │ local.size * world.scale                           │
/// │ opacity        │ parent.opacity * local.opacity                     │
/// │ rotation       │ parent.rotation + local.rotation                   │
/// └────────────────┴────────────────────────────────────────────────────┘
pub fn compute_world(local: &Local, parent: Option<&World>) -> World {
    let parent = parent.unwrap_or(&World::IDENTITY);

    let scale_x = parent.scale_x * local.scale_x;
    let scale_y = parent.scale_y * local.scale_y;

    let (x, y) = rotate_point(
        local.x() * parent.scale_x,
        local.y() * parent.scale_y,
        parent.rotation,
    );

    World {
        x: x + parent.x,
        y: y + parent.y,
        width: local.width * scale_x,
        height: local.height * scale_y,
        opacity: parent.opacity * local.opacity,
        rotation: parent.rotation + local.rotation,
        scale_x,
        scale_y,
    }
}
