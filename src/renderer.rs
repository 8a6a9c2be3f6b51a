use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }
}

/// Drawing surface the render pass writes to
/// - state changes are scoped by save()/restore() pairs
/// - calls never fail, an implementation that can fail logs and carries on
pub trait Surface {
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f64, y: f64);
    /// radians
    fn rotate(&mut self, angle: f64);
    fn scale(&mut self, x: f64, y: f64);
    fn set_opacity(&mut self, opacity: f64);
    fn fill_rect(&mut self, rect: &Rect, color: &str);
    /// wipe the whole surface
    fn clear(&mut self);
}

/// [`Surface`] backed by a 2d canvas context
pub struct Renderer {
    context: CanvasRenderingContext2d,
}

impl Renderer {
    pub fn new(context: CanvasRenderingContext2d) -> Self {
        Renderer { context }
    }

    pub fn context(&self) -> &CanvasRenderingContext2d {
        &self.context
    }

    fn report(call: &str, result: Result<(), JsValue>) {
        if let Err(err) = result {
            log!("[renderer] {} failed : {:#?}", call, err);
        }
    }
}

impl Surface for Renderer {
    fn save(&mut self) {
        self.context.save();
    }

    fn restore(&mut self) {
        self.context.restore();
    }

    fn translate(&mut self, x: f64, y: f64) {
        Self::report("translate", self.context.translate(x, y));
    }

    fn rotate(&mut self, angle: f64) {
        Self::report("rotate", self.context.rotate(angle));
    }

    fn scale(&mut self, x: f64, y: f64) {
        Self::report("scale", self.context.scale(x, y));
    }

    fn set_opacity(&mut self, opacity: f64) {
        self.context.set_global_alpha(opacity);
    }

    fn fill_rect(&mut self, rect: &Rect, color: &str) {
        self.context.set_fill_style_str(color);
        self.context
            .fill_rect(rect.x, rect.y, rect.width, rect.height);
    }

    fn clear(&mut self) {
        // without a backing canvas there is nothing to clear
        if let Some(canvas) = self.context.canvas() {
            self.context.clear_rect(
                0.0,
                0.0,
                f64::from(canvas.width()),
                f64::from(canvas.height()),
            );
        }
    }
}
