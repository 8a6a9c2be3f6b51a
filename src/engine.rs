use crate::browser::{self, LoopClosure};
use crate::config::LoopConfig;
use crate::error::LoopError;
use crate::events::{Event, EventBus};
use crate::renderer::{Renderer, Surface};
use anyhow::{anyhow, Result};
// ELI5: web assembly is a single threaded environment, so Rc RefCell > Mutex
use async_trait::async_trait;
use std::cell::RefCell;
use std::rc::Rc;

#[async_trait(?Send)]
pub trait Game {
    async fn initialize(&self) -> Result<Box<dyn Game>>;
    /// `step` is the fixed step length in seconds
    fn update(&mut self, step: f64);
    fn draw(&mut self, surface: &mut dyn Surface);
}

/// frames arriving more than this many ms apart are dropped (tab was backgrounded)
pub const STALL_GUARD_MS: f64 = 1000.0;

/// Handle of a scheduled frame callback (requestAnimationFrame id in the browser)
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FrameHandle(pub i32);

/// The host's display refresh primitive
/// - request_frame() arranges for GameLoop::frame() to be called once, on the next refresh
pub trait FrameScheduler {
    fn request_frame(&mut self) -> Result<FrameHandle>;
    fn cancel_frame(&mut self, handle: FrameHandle) -> Result<()>;
    /// monotonic time in ms
    fn now(&self) -> Result<f64>;
}

/// What a single call to [`GameLoop::frame`] did
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum FrameOutcome {
    /// window not focused, nothing ran
    Unfocused,
    /// `dt` was over the stall guard, nothing ran
    Stalled { dt: f64 },
    /// `steps` fixed updates ran, then one render
    Rendered { steps: u32 },
}

type UpdateFn = Box<dyn FnMut(f64)>;
type RenderFn<S> = Box<dyn FnMut(&mut S)>;

/// Collects the pieces of a [`GameLoop`], render is the only required one
pub struct LoopBuilder<S> {
    config: LoopConfig,
    update: Option<UpdateFn>,
    render: Option<RenderFn<S>>,
    events: Option<Rc<EventBus>>,
}

impl<S: Surface> Default for LoopBuilder<S> {
    fn default() -> Self {
        LoopBuilder {
            config: LoopConfig::default(),
            update: None,
            render: None,
            events: None,
        }
    }
}

impl<S: Surface> LoopBuilder<S> {
    pub fn config(mut self, config: LoopConfig) -> Self {
        self.config = config;
        self
    }

    pub fn update(mut self, update: impl FnMut(f64) + 'static) -> Self {
        self.update = Some(Box::new(update));
        self
    }

    pub fn render(mut self, render: impl FnMut(&mut S) + 'static) -> Self {
        self.render = Some(Box::new(render));
        self
    }

    /// Bus that receives [`Event::Tick`] once per simulated frame
    pub fn events(mut self, events: Rc<EventBus>) -> Self {
        self.events = Some(events);
        self
    }

    /// # Returns
    /// * `Ok(GameLoop)` - stopped, call start() to run it
    /// * `Err(LoopError::Configuration)` - no render callback, or fps of 0
    pub fn build<F: FrameScheduler>(
        self,
        scheduler: F,
        surface: S,
    ) -> Result<GameLoop<F, S>, LoopError> {
        let render = self.render.ok_or_else(|| {
            LoopError::Configuration("a render callback is required".to_string())
        })?;
        if self.config.fps == 0 {
            return Err(LoopError::Configuration(
                "fps must be greater than 0".to_string(),
            ));
        }

        let update: UpdateFn = match self.update {
            Some(update) => update,
            None => Box::new(|_: f64| {}),
        };

        Ok(GameLoop {
            delta: self.config.delta_ms(),
            step: self.config.step(),
            focused: true,
            config: self.config,
            update,
            render,
            events: self.events.unwrap_or_default(),
            scheduler,
            surface,
            accumulator: 0.0,
            last_frame: 0.0,
            pending: None,
            stopped: true,
        })
    }
}

/// Fixed step game loop
///
/// TABLE:
/// ┌──────────────────────────── One Frame ─────────────────────────────┐
/// │ 1. request next frame (always first)                               │
/// │ 2. unfocused?                  → return Unfocused                  │
/// │ 3. dt = now - last_frame                                           │
/// │ 4. dt > 1000ms?                → return Stalled                    │
/// │ 5. emit Tick, accumulator += dt                                    │
/// │ 6. while accumulator >= delta → update(step), accumulator -= delta │
/// │ 7. clear surface (optional), render once                           │
/// └────────────────────────────────────────────────────────────────────┘
/// - every update receives the same `step` (1 / fps seconds)
/// - leftover time stays in the accumulator for the next frame
pub struct GameLoop<F, S> {
    config: LoopConfig,
    /// ms per fixed step
    delta: f64,
    /// seconds per fixed step
    step: f64,
    update: UpdateFn,
    render: RenderFn<S>,
    events: Rc<EventBus>,
    scheduler: F,
    surface: S,
    accumulator: f64,
    last_frame: f64,
    pending: Option<FrameHandle>,
    stopped: bool,
    focused: bool,
}

impl<S: Surface> GameLoop<(), S> {
    pub fn builder() -> LoopBuilder<S> {
        LoopBuilder::default()
    }
}

impl<F: FrameScheduler, S: Surface> GameLoop<F, S> {
    pub fn start(&mut self) -> Result<()> {
        if !self.stopped {
            log!("[engine] start() ignored, loop is already running");
            return Ok(());
        }
        self.last_frame = self.scheduler.now()?;
        self.stopped = false;
        self.pending = Some(self.scheduler.request_frame()?);
        log!("[engine] loop started at {} fps", self.config.fps);
        Ok(())
    }

    /// Cancel the pending frame, calling it again does nothing
    pub fn stop(&mut self) -> Result<()> {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle)?;
            log!("[engine] loop stopped");
        }
        self.stopped = true;
        Ok(())
    }

    /// Frame callback, called by the scheduler with the frame timestamp in ms
    pub fn frame(&mut self, now: f64) -> Result<FrameOutcome> {
        // reschedule first, stop() works by cancelling this request
        self.pending = Some(self.scheduler.request_frame()?);

        if !self.focused && !self.config.run_when_unfocused {
            return Ok(FrameOutcome::Unfocused);
        }

        let dt = now - self.last_frame;
        self.last_frame = now;

        if dt > STALL_GUARD_MS {
            log!("[engine] dropping stalled frame, dt = {:.1}ms", dt);
            return Ok(FrameOutcome::Stalled { dt });
        }

        self.events.emit(&Event::Tick);
        self.accumulator += dt;

        let mut steps = 0;
        while self.accumulator >= self.delta {
            (self.update)(self.step);
            self.accumulator -= self.delta;
            steps += 1;
        }

        if self.config.clear_surface_each_frame {
            self.surface.clear();
        }
        (self.render)(&mut self.surface);

        Ok(FrameOutcome::Rendered { steps })
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// ms of simulation time not yet consumed by a fixed step
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    pub fn events(&self) -> &Rc<EventBus> {
        &self.events
    }

    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}

// ==================== Browser ====================

type SharedLoopClosure = Rc<RefCell<Option<LoopClosure>>>;

/// [`FrameScheduler`] on top of requestAnimationFrame
/// - the closure is installed by [`run`] once the loop it drives exists
pub struct BrowserScheduler {
    callback: SharedLoopClosure,
}

impl FrameScheduler for BrowserScheduler {
    fn request_frame(&mut self) -> Result<FrameHandle> {
        let callback = self.callback.borrow();
        let callback = callback
            .as_ref()
            .ok_or_else(|| anyhow!("BrowserScheduler: frame callback is not installed"))?;
        browser::request_animation_frame(callback).map(FrameHandle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) -> Result<()> {
        browser::cancel_animation_frame(handle.0)
    }

    fn now(&self) -> Result<f64> {
        browser::now()
    }
}

pub type BrowserLoop = GameLoop<BrowserScheduler, Renderer>;

/// Build the loop against the page canvas and start it
/// - the returned loop lives as long as the page, keep the Rc to stop() it later
/// - window focus/blur drive set_focused() unless `run_when_unfocused` is set
pub fn run(builder: LoopBuilder<Renderer>) -> Result<Rc<RefCell<BrowserLoop>>> {
    let callback: SharedLoopClosure = Rc::new(RefCell::new(None));
    let scheduler = BrowserScheduler {
        callback: callback.clone(),
    };
    let renderer = Renderer::new(browser::context()?);
    let game_loop = Rc::new(RefCell::new(builder.build(scheduler, renderer)?));

    let frame_loop = game_loop.clone();
    *callback.borrow_mut() = Some(browser::create_raf_closure(move |perf: f64| {
        if let Err(err) = frame_loop.borrow_mut().frame(perf) {
            log!("[engine] frame failed : {:#}", err);
        }
    }));

    if !game_loop.borrow().config().run_when_unfocused {
        let focus_loop = game_loop.clone();
        browser::add_window_listener("focus", move || {
            focus_loop.borrow_mut().set_focused(true)
        })?;
        let blur_loop = game_loop.clone();
        browser::add_window_listener("blur", move || {
            blur_loop.borrow_mut().set_focused(false)
        })?;
    }

    game_loop.borrow_mut().start()?;
    Ok(game_loop)
}

/// Initialize `game` and run it until the page goes away
pub async fn start_game(
    game: impl Game + 'static,
    config: LoopConfig,
    events: Rc<EventBus>,
) -> Result<Rc<RefCell<BrowserLoop>>> {
    let game = Rc::new(RefCell::new(game.initialize().await?));
    let update_game = game.clone();
    let builder = GameLoop::builder()
        .config(config)
        .events(events)
        .update(move |step| update_game.borrow_mut().update(step))
        .render(move |renderer: &mut Renderer| game.borrow_mut().draw(renderer));
    run(builder)
}
