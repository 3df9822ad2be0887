//! Zero-Cost Safety Macros
//!
//! Debug checks in dev, raw speed in prod.
//!
//! In Debug mode: Normal bounds-checked access (panics with useful errors)
//! In Release mode: Unsafe unchecked access (zero overhead)
//!
//! Only use this for indices that are in-bounds by construction: match tables
//! are sized to the whole material-id domain, grid indices come from
//! `Grid::in_bounds` checks.
//!
//! Usage:
//! ```rust
//! use sandrule_engine::fast;
//!
//! let table = [7u8; 256];
//! let id: u8 = 200;
//! // Read: fast!(slice, [index])
//! let slot = *fast!(table, [id as usize]);
//! assert_eq!(slot, 7);
//!
//! let mut cells = vec![0u8; 5];
//! // Write: fast!(slice, [index] = value)
//! fast!(cells, [2] = 3);
//! assert_eq!(cells[2], 3);
//! ```

/// Zero-cost bounds checking macro
///
/// - Debug: Uses normal indexing with bounds checks
/// - Release: Uses get_unchecked/get_unchecked_mut
#[macro_export]
macro_rules! fast {
    // Read pattern: fast!(slice, [index])
    ($slice:expr, [$index:expr]) => {{
        #[cfg(debug_assertions)]
        {
            &$slice[$index]
        }
        #[cfg(not(debug_assertions))]
        {
            unsafe { $slice.get_unchecked($index) }
        }
    }};

    // Write pattern: fast!(slice, [index] = value)
    ($slice:expr, [$index:expr] = $val:expr) => {{
        #[cfg(debug_assertions)]
        {
            $slice[$index] = $val;
        }
        #[cfg(not(debug_assertions))]
        {
            unsafe {
                *$slice.get_unchecked_mut($index) = $val;
            }
        }
    }};
}
