//! Test doubles for the browser collaborators
use crate::engine::{FrameHandle, FrameScheduler};
use crate::renderer::{Rect, Surface};
use anyhow::Result;

/// Every call a [`RecordingSurface`] received, in order
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    Save,
    Restore,
    Translate(f64, f64),
    Rotate(f64),
    Scale(f64, f64),
    Opacity(f64),
    FillRect(Rect, String),
    Clear,
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub calls: Vec<SurfaceCall>,
}

impl RecordingSurface {
    pub fn count(&self, wanted: &SurfaceCall) -> usize {
        self.calls.iter().filter(|call| *call == wanted).count()
    }
}

impl Surface for RecordingSurface {
    fn save(&mut self) {
        self.calls.push(SurfaceCall::Save);
    }

    fn restore(&mut self) {
        self.calls.push(SurfaceCall::Restore);
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.calls.push(SurfaceCall::Translate(x, y));
    }

    fn rotate(&mut self, angle: f64) {
        self.calls.push(SurfaceCall::Rotate(angle));
    }

    fn scale(&mut self, x: f64, y: f64) {
        self.calls.push(SurfaceCall::Scale(x, y));
    }

    fn set_opacity(&mut self, opacity: f64) {
        self.calls.push(SurfaceCall::Opacity(opacity));
    }

    fn fill_rect(&mut self, rect: &Rect, color: &str) {
        self.calls.push(SurfaceCall::FillRect(*rect, color.to_string()));
    }

    fn clear(&mut self) {
        self.calls.push(SurfaceCall::Clear);
    }
}

/// Hand driven stand-in for requestAnimationFrame
/// - `pending` is the handle of the frame that would fire next, if any
#[derive(Debug, Default)]
pub struct ManualScheduler {
    pub now: f64,
    pub pending: Option<FrameHandle>,
    pub requested: u32,
    pub cancelled: Vec<FrameHandle>,
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> Result<FrameHandle> {
        self.requested += 1;
        let handle = FrameHandle(self.requested as i32);
        self.pending = Some(handle);
        Ok(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) -> Result<()> {
        if self.pending == Some(handle) {
            self.pending = None;
        }
        self.cancelled.push(handle);
        Ok(())
    }

    fn now(&self) -> Result<f64> {
        Ok(self.now)
    }
}
