//! Browser-side smoke tests; run with `wasm-pack test --headless --chrome`.
#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

use powder_engine::{el_dust, el_water, World};

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn world_steps_and_exposes_its_buffers() {
    let mut world = World::new(64, 64).unwrap();
    assert!(world.create(10, 10, el_water()) >= 0);
    world.create_in_radius(30, 30, 3, el_dust());
    world.step();
    world.render();

    let layout = world.abi_layout();
    assert_eq!(layout.colors_len_elements(), 64 * 64);
    assert_eq!(layout.cells_len_elements(), 16 * 16);
    assert!(layout.parts_len_elements() >= world.particle_count());
    assert_eq!(world.frame(), 1);
}

#[wasm_bindgen_test]
fn config_round_trips_through_json() {
    let mut world = World::new(32, 32).unwrap();
    world.set_config_json(r#"{"seed": 42, "heat": false}"#).unwrap();
    let json = world.get_config_json();
    assert!(json.contains("\"seed\":42"));
    assert!(world.set_air_mode(7).is_err());
}
