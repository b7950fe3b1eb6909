//! Zero-Cost Safety Macros
//!
//! Solver inner loops index node arrays by link endpoints that were validated
//! when the patch was built. Debug builds keep the bounds checks so a broken
//! topology panics with a useful message; release builds skip them.
//!
//! Usage:
//! ```rust
//! use drape_engine::fast;
//!
//! let inv_mass = vec![1.0f32, 0.0, 1.0];
//! let w = *fast!(inv_mass, [1]);
//! assert_eq!(w, 0.0);
//!
//! let mut positions = vec![0.0f32; 3];
//! fast!(positions, [2] = 4.5);
//! assert_eq!(positions[2], 4.5);
//! ```

/// Bounds-checked in debug, unchecked in release.
///
/// Only use with indices that come from a validated topology (link
/// endpoints, cluster members).
#[macro_export]
macro_rules! fast {
    // Read: fast!(slice, [index])
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

    // Write: fast!(slice, [index] = value)
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
