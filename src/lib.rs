// ==================== Imports ====================
use std::rc::Rc;
use wasm_bindgen::prelude::*;

#[macro_use]
mod browser;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod game;
pub mod renderer;
pub mod scene;
pub mod sprite;
pub mod vector;

#[cfg(test)]
mod testing;

use crate::config::LoopConfig;
use crate::events::{Event, EventBus};

/// served next to index.html, optional
const LOOP_CONFIG_PATH: &str = "loop.json";

// ==================== Main Functions ====================
/// Main entry for Webassembly module
/// - loads the loop config (defaults if missing)
/// - announces Init on the event bus
/// - starts the demo game loop
#[wasm_bindgen]
pub fn main_js() -> Result<(), JsValue> {
    // setup better panic messages for debugging
    console_error_panic_hook::set_once();

    let events = Rc::new(EventBus::new());

    // spawns a new asynchronous task in local thread, for web assembly
    // environment, using wasm_bindgen_futures
    browser::spawn_local(async move {
        let config = LoopConfig::fetch_or_default(LOOP_CONFIG_PATH).await;
        events.emit(&Event::Init);

        if let Err(err) = engine::start_game(game::Drift::new(), config, events).await {
            log!("[main] could not start game : {:#}", err);
        }
    });

    Ok(())
}
