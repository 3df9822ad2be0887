use std::sync::Arc;

use sandrule_engine::{
    Catalog, CompileError, EmitterHandler, RuleBook, Simulation, SimulationConfig, EMPTY,
};

const BUNDLE: &str = r#"{
    "materials": [
        { "id": 1, "name": "rock", "immobile": true, "tags": ["solid"] },
        { "id": 2, "name": "dust", "gravity": 1.0, "density": 1.0, "tags": ["powder"],
          "rules": [ {
              "chance": { "property": "gravity" },
              "sampler": { "kind": "offsets", "offsets": [[0, 1]] },
              "matchers": [ { "when": { "ids": [0] }, "outcome": 0 } ],
              "outcomes": [ { "op": "swap" } ],
              "pass": "falling",
              "stamp": true
          } ] },
        { "id": 9, "name": "fountain", "immobile": true, "spawner": true, "handler": "tap" }
    ]
}"#;

const ROCK: u8 = 1;
const DUST: u8 = 2;
const FOUNTAIN: u8 = 9;

fn bundle_sim(width: u32, height: u32) -> Simulation {
    let catalog = Catalog::from_bundle_json(BUNDLE).expect("bundle should parse");
    let book = RuleBook::compile(catalog).expect("bundle should compile");
    Simulation::new(SimulationConfig::new(width, height, 3), Arc::new(book)).unwrap()
}

fn count(sim: &Simulation, id: u8) -> usize {
    sim.cells().iter().filter(|&&c| c == id).count()
}

#[test]
fn bundle_compiles_and_manifest_lists_materials() {
    let sim = bundle_sim(16, 16);
    let book = sim.book();
    assert!(book.is_known(EMPTY));
    assert!(book.is_known(DUST));
    assert!(!book.is_known(3));
    assert!(book.is_special(FOUNTAIN));
    assert!(book.is_immobile(ROCK));
    assert_eq!(book.handler_key(FOUNTAIN), Some("tap"));

    let manifest = book.catalog().manifest_json();
    for name in ["rock", "dust", "fountain"] {
        assert!(manifest.contains(name), "{name} missing from {manifest}");
    }
}

#[test]
fn bundle_dust_settles_on_rock() {
    let mut sim = bundle_sim(16, 16);
    for x in 0..16 {
        sim.set_cell(x, 10, ROCK);
    }
    sim.set_cell(5, 0, DUST);
    sim.steps(30);

    assert_eq!(sim.get_cell(5, 9), DUST);
    assert_eq!(count(&sim, DUST), 1);
    assert_eq!(count(&sim, ROCK), 16);
}

#[test]
fn bundle_handler_binds_by_key() {
    let mut sim = bundle_sim(16, 16);
    assert_eq!(sim.bind_handler("tap", Arc::new(EmitterHandler::new(DUST, 1.0))), 1);
    assert_eq!(sim.bind_handler("nothing-uses-this", Arc::new(EmitterHandler::new(DUST, 1.0))), 0);

    sim.set_cell(8, 2, FOUNTAIN);
    sim.step();
    assert_eq!(sim.get_cell(8, 2), FOUNTAIN);
    assert_eq!(count(&sim, DUST), 1);
}

#[test]
fn bundle_with_dangling_outcome_fails_to_compile() {
    let json = r#"{
        "materials": [
            { "id": 4, "name": "broken",
              "rules": [ {
                  "sampler": { "kind": "offsets", "offsets": [[1, 0]] },
                  "matchers": [ { "when": { "ids": [0] }, "outcome": 2 } ],
                  "outcomes": [ { "op": "noop" } ]
              } ] }
        ]
    }"#;
    let catalog = Catalog::from_bundle_json(json).unwrap();
    assert!(matches!(
        RuleBook::compile(catalog),
        Err(CompileError::OutcomeOutOfRange { outcome: 2, outcomes: 1, .. })
    ));
}
