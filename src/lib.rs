// ==================== Imports ====================
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsValue;

#[macro_use]
mod browser;
pub mod camera;
pub mod engine;
pub mod game;
pub mod player;
pub mod projectile;
pub mod settings;
pub mod sprite;
pub mod stage;

use engine::GameLoop;
use game::BusterRun;

// ==================== Main Functions ====================
/// Main entry for Webassembly module
/// - installs the panic hook
/// - loads assets and starts the game loop
///
/// Loading is asynchronous, a failure (missing sprite sheet, no canvas) is
/// reported on the console once it happens.
#[wasm_bindgen]
pub fn main_js() -> Result<(), JsValue> {
    // setup better panic messages for debugging
    console_error_panic_hook::set_once();

    browser::spawn_local(async move {
        if let Err(err) = GameLoop::start(BusterRun::new()).await {
            error!("[startup] could not start the game : {:#?}", err);
        }
    });

    Ok(())
}
