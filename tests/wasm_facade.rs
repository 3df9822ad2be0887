#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

use sandrule_engine::{ids, Sandbox};

#[wasm_bindgen_test]
fn sandbox_steps_and_paints() {
    let mut sandbox = Sandbox::new(64, 48, 7).unwrap();
    assert_eq!((sandbox.width(), sandbox.height()), (64, 48));
    assert_eq!(sandbox.cells_len(), 64 * 48);

    assert!(sandbox.fill_disc(32, 10, 3, ids::SAND) > 0);
    sandbox.steps(10);
    assert_eq!(sandbox.step_count(), 10);

    sandbox.erase_disc(32, 10, 64);
    assert!((0..48).all(|y| (0..64).all(|x| sandbox.get_cell(x, y) == 0)));
}

#[wasm_bindgen_test]
fn sandbox_rejects_bad_input() {
    assert!(Sandbox::new(0, 10, 1).is_err());
    assert!(Sandbox::from_bundle("{ nope", 8, 8, 1).is_err());

    let mut sandbox = Sandbox::new(8, 8, 1).unwrap();
    assert!(sandbox.load(b"JUNK").is_err());
}

#[wasm_bindgen_test]
fn sandbox_save_load_round_trip() {
    let mut a = Sandbox::new(32, 32, 5).unwrap();
    a.fill_disc(16, 16, 4, ids::WATER);
    a.steps(3);
    let bytes = a.save();

    let mut b = Sandbox::new(8, 8, 1).unwrap();
    b.load(&bytes).unwrap();
    assert_eq!((b.width(), b.height()), (32, 32));
    assert_eq!(b.seed(), 5);
    assert_eq!(b.save(), bytes);
}

#[wasm_bindgen_test]
fn sandbox_tap_emits_water() {
    let mut sandbox = Sandbox::new(32, 32, 2).unwrap();
    sandbox.set_cell(16, 4, ids::TAP);
    sandbox.steps(20);
    let water = (0..32)
        .flat_map(|y| (0..32).map(move |x| (x, y)))
        .filter(|&(x, y)| sandbox.get_cell(x, y) == ids::WATER)
        .count();
    assert!(water > 0);
    assert!(sandbox.manifest_json().contains("water"));
}
