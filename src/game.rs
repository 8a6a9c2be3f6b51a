use crate::browser;
use crate::engine::Game;
use crate::renderer::Surface;
use crate::scene::{NodeId, NodeProps, Scene};
use crate::sprite::Sprite;
use crate::vector::Vector2;
use anyhow::{anyhow, Result};
use async_trait::async_trait;

/// Demo: a block drifting right across the canvas, wrapping back in from the
/// left, carrying a half transparent marker as a child
pub enum Drift {
    /// waiting for initialize()
    Loading,

    /// scene built, ready to run
    Loaded(Stage),
}

impl Drift {
    pub fn new() -> Self {
        Drift::Loading
    }
}

impl Default for Drift {
    fn default() -> Self {
        Drift::new()
    }
}

#[async_trait(?Send)]
impl Game for Drift {
    async fn initialize(&self) -> Result<Box<dyn Game>> {
        match self {
            Drift::Loading => {
                let width = f64::from(browser::canvas()?.width());
                Ok(Box::new(Drift::Loaded(Stage::new(width)?)))
            }
            Drift::Loaded(_) => Err(anyhow!("Game is already initialized")),
        }
    }

    fn update(&mut self, _step: f64) {
        if let Drift::Loaded(stage) = self {
            if let Err(err) = stage.update() {
                log!("[game] update failed : {}", err);
            }
        }
    }

    fn draw(&mut self, surface: &mut dyn Surface) {
        if let Drift::Loaded(stage) = self {
            stage.scene.render_roots(surface);
        }
    }
}

pub struct Stage {
    scene: Scene,
    block: NodeId,
    /// the block wraps once its x passes this
    bounds_width: f64,
}

impl Stage {
    pub fn new(bounds_width: f64) -> Result<Self> {
        let mut scene = Scene::new();
        let block = scene.spawn_with(
            NodeProps {
                position: Vector2::new(100.0, 80.0),
                width: 20.0,
                height: 40.0,
                // 2px to the right every frame
                velocity: Vector2::new(2.0, 0.0),
                ..NodeProps::default()
            },
            Sprite::new("blue"),
        );
        let marker = scene.spawn_with(
            NodeProps {
                position: Vector2::new(5.0, -15.0),
                width: 10.0,
                height: 10.0,
                opacity: 0.5,
                ..NodeProps::default()
            },
            Sprite::new("red"),
        );
        scene.add_child(block, marker)?;

        Ok(Stage {
            scene,
            block,
            bounds_width,
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn block(&self) -> NodeId {
        self.block
    }

    /// One fixed step: move everything, then wrap the block
    pub fn update(&mut self) -> Result<()> {
        self.scene.update_roots(None)?;

        let local = self
            .scene
            .local(self.block)
            .ok_or_else(|| anyhow!("block node is missing"))?;
        if local.x() > self.bounds_width {
            let width = local.width;
            self.scene.set_x(self.block, -width)?;
        }
        Ok(())
    }
}
