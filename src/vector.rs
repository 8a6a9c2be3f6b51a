use serde::{Deserialize, Serialize};

/// Clamp `value` into `[min, max]`
/// - `min` wins over `max` when the range is inverted, same as `max(min, value).min(max)`
pub fn clamp(min: f64, max: f64, value: f64) -> f64 {
    min.max(value).min(max)
}

/// Axis aligned rectangle a clamped vector is kept inside of
#[derive(Debug, Copy, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClampRect {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

/// 2D vector
/// - every operation returns a NEW vector, the receiver is left untouched
/// - `set`, `set_x` and `set_y` are the only in place writes
///
/// TABLE:
/// ┌──────────────┬───────────────────────────┬──────────────────────┐
/// │ Operation    │ Result                    │ Keeps clamp rect?    │
/// ├──────────────┼───────────────────────────┼──────────────────────┤
/// │ add          │ self + other              │ yes                  │
/// │ subtract     │ self - other              │ yes                  │
/// │ scale        │ self * value              │ no                   │
/// │ normalize    │ self / length             │ no                   │
/// └──────────────┴───────────────────────────┴──────────────────────┘
#[derive(Debug, Copy, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Vector2 {
    x: f64,
    y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bounds: Option<ClampRect>,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 {
        x: 0.0,
        y: 0.0,
        bounds: None,
    };

    pub fn new(x: f64, y: f64) -> Self {
        Vector2 { x, y, bounds: None }
    }

    /// Build a vector carrying `bounds`, with `x`/`y` clamped on the way in
    fn with_bounds(x: f64, y: f64, bounds: Option<ClampRect>) -> Self {
        let mut vector = Vector2 { x, y, bounds };
        vector.set_x(x);
        vector.set_y(y);
        vector
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn bounds(&self) -> Option<ClampRect> {
        self.bounds
    }

    pub fn set_x(&mut self, value: f64) {
        self.x = match self.bounds {
            Some(rect) => clamp(rect.x_min, rect.x_max, value),
            None => value,
        };
    }

    pub fn set_y(&mut self, value: f64) {
        self.y = match self.bounds {
            Some(rect) => clamp(rect.y_min, rect.y_max, value),
            None => value,
        };
    }

    /// Copy the coordinates of `other` into self (clamp rect of self applies)
    pub fn set(&mut self, other: &Vector2) {
        self.set_x(other.x);
        self.set_y(other.y);
    }

    /// Install a clamp rectangle
    /// - current coordinates are NOT re-clamped, only later writes are
    pub fn clamp(&mut self, x_min: f64, y_min: f64, x_max: f64, y_max: f64) {
        self.bounds = Some(ClampRect {
            x_min,
            y_min,
            x_max,
            y_max,
        });
    }

    pub fn add(&self, other: &Vector2) -> Vector2 {
        Vector2::with_bounds(self.x + other.x, self.y + other.y, self.bounds)
    }

    pub fn subtract(&self, other: &Vector2) -> Vector2 {
        Vector2::with_bounds(self.x - other.x, self.y - other.y, self.bounds)
    }

    pub fn scale(&self, value: f64) -> Vector2 {
        Vector2::new(self.x * value, self.y * value)
    }

    /// Unit vector in the same direction, a zero vector stays zero
    pub fn normalize(&self) -> Vector2 {
        let length = match self.length() {
            length if length == 0.0 => 1.0,
            length => length,
        };
        Vector2::new(self.x / length, self.y / length)
    }

    pub fn dot(&self, other: &Vector2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(&self, other: &Vector2) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Angle in radians between self and `other`
    pub fn angle(&self, other: &Vector2) -> f64 {
        (self.dot(other) / (self.length() * other.length())).acos()
    }

    /// Heading of the vector in radians, measured from +x
    pub fn direction(&self) -> f64 {
        self.y.atan2(self.x)
    }
}

impl From<(f64, f64)> for Vector2 {
    fn from((x, y): (f64, f64)) -> Self {
        Vector2::new(x, y)
    }
}
