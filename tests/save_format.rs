use std::sync::Arc;

use proptest::prelude::*;

use sandrule_engine::simulation::format::{self, CURRENT_VERSION, MAGIC};
use sandrule_engine::{ids, RuleBook, SaveError, Simulation, SimulationConfig, EMPTY};

fn sim(width: u32, height: u32, seed: u32) -> Simulation {
    let book = Arc::new(RuleBook::builtin().unwrap());
    Simulation::new(SimulationConfig::new(width, height, seed), book).unwrap()
}

#[test]
fn header_layout_is_stable() {
    let mut s = sim(3, 2, 0x0102_0304);
    s.set_cell(0, 0, ids::SAND);
    let bytes = s.save();

    assert_eq!(&bytes[0..4], MAGIC);
    assert_eq!(bytes[4], CURRENT_VERSION);
    assert_eq!(&bytes[5..7], &3u16.to_le_bytes());
    assert_eq!(&bytes[7..9], &2u16.to_le_bytes());
    assert_eq!(&bytes[9..13], &s.rng_state().to_le_bytes());
    assert_eq!(&bytes[13..17], &0u32.to_le_bytes());
    assert_eq!(&bytes[17..21], &0x0102_0304u32.to_le_bytes());
    assert_eq!(&bytes[21..], &[ids::SAND, EMPTY, EMPTY, EMPTY, EMPTY, EMPTY]);
}

#[test]
fn bad_version_and_bad_magic_are_distinct() {
    let mut s = sim(4, 4, 1);
    let mut bytes = s.save();

    bytes[4] = 42;
    assert_eq!(s.load(&bytes), Err(SaveError::UnsupportedVersion(42)));

    bytes[4] = CURRENT_VERSION;
    bytes[0] = b'X';
    assert!(matches!(s.load(&bytes), Err(SaveError::BadMagic { .. })));
}

#[test]
fn truncated_and_oversized_buffers_fail() {
    let mut s = sim(4, 4, 1);
    let bytes = s.save();
    assert!(matches!(s.load(&bytes[..bytes.len() - 1]), Err(SaveError::Truncated { .. })));
    assert!(matches!(s.load(&bytes[..10]), Err(SaveError::Truncated { .. })));

    let mut long = bytes.clone();
    long.push(0);
    assert!(matches!(s.load(&long), Err(SaveError::TrailingBytes { .. })));
}

#[test]
fn v2_restores_rng_and_zeroes_step() {
    let mut s = sim(2, 2, 5);
    s.steps(4);

    let mut v2 = MAGIC.to_vec();
    v2.push(2);
    v2.extend_from_slice(&2u16.to_le_bytes());
    v2.extend_from_slice(&1u16.to_le_bytes());
    v2.extend_from_slice(&0xDEAD_BEEFu32.to_le_bytes());
    v2.extend_from_slice(&[ids::WATER, ids::SAND]);

    s.load(&v2).unwrap();
    assert_eq!(s.rng_state(), 0xDEAD_BEEF);
    assert_eq!(s.step_count(), 0);
    assert_eq!(s.seed(), 5);
    assert_eq!((s.width(), s.height()), (2, 1));
    assert_eq!(s.get_cell(1, 0), ids::SAND);
}

#[test]
fn v3_restores_step() {
    let mut s = sim(2, 2, 5);
    let mut v3 = MAGIC.to_vec();
    v3.push(3);
    v3.extend_from_slice(&1u16.to_le_bytes());
    v3.extend_from_slice(&1u16.to_le_bytes());
    v3.extend_from_slice(&77u32.to_le_bytes());
    v3.extend_from_slice(&1234u32.to_le_bytes());
    v3.push(ids::STONE);

    s.load(&v3).unwrap();
    assert_eq!(s.rng_state(), 77);
    assert_eq!(s.step_count(), 1234);
    assert_eq!(s.get_cell(0, 0), ids::STONE);
}

fn known_ids() -> Vec<u8> {
    let book = RuleBook::builtin().unwrap();
    (0..=255u8).filter(|&id| book.is_known(id)).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn load_of_save_round_trips(
        width in 1u32..48,
        height in 1u32..48,
        seed in any::<u32>(),
        steps in 0u32..6,
        picks in prop::collection::vec(any::<prop::sample::Index>(), 0..200),
    ) {
        let ids = known_ids();
        let mut a = sim(width, height, seed);
        for (k, pick) in picks.iter().enumerate() {
            let i = (k * 7919) % (width * height) as usize;
            a.set_cell((i as u32 % width) as i32, (i as u32 / width) as i32, ids[pick.index(ids.len())]);
        }
        a.steps(steps);
        let bytes = a.save();

        let mut b = sim(5, 5, 0);
        b.load(&bytes).unwrap();
        prop_assert_eq!((b.width(), b.height()), (width, height));
        prop_assert_eq!(b.step_count(), steps);
        prop_assert_eq!(b.rng_state(), a.rng_state());
        prop_assert_eq!(b.cells(), a.cells());

        let snapshot = format::decode(&bytes).unwrap();
        prop_assert_eq!(snapshot.version, CURRENT_VERSION);
        prop_assert_eq!(snapshot.seed, Some(seed));
    }
}
