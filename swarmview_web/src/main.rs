// Trunk builds this binary; on native targets it does nothing.

fn main() {}

#[cfg(all(feature = "web", target_arch = "wasm32"))]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn wasm_start() {
    swarmview_web::start();
}
