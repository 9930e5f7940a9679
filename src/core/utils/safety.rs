//! Zero-Cost Safety Macros
//!
//! Field and occupancy accessors sit on the hottest paths of a tick, and their
//! coordinates are a caller obligation (element callbacks must bounds-check
//! before touching the grids). These macros keep that contract cheap:
//!
//! In Debug mode: Normal bounds-checked access (panics with useful errors)
//! In Release mode: Unsafe unchecked access (zero overhead)
//!
//! Usage:
//! ```rust
//! use powder_engine::fast;
//!
//! let cells_x = 4;
//! let pressure = vec![0.0f32, 1.5, -2.0, 3.25];
//! // Read: fast!(slice, [index])
//! let pv = *fast!(pressure, [1 * cells_x / 4 + 1]);
//! assert_eq!(pv, -2.0);
//!
//! let mut emap = vec![0u8; 4];
//! // Write: fast!(slice, [index] = value)
//! fast!(emap, [3] = 16);
//! assert_eq!(emap[3], 16);
//! ```

/// Bounds checking that disappears in release builds
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
            #[allow(unused_unsafe)]
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
            #[allow(unused_unsafe)]
            unsafe { *$slice.get_unchecked_mut($index) = $val; }
        }
    }};
}

/// Mutable-reference flavour of `fast!` for read-modify-write updates
/// (`*fast_mut!(pv, [idx]) += dp`).
#[macro_export]
macro_rules! fast_mut {
    ($slice:expr, [$index:expr]) => {{
        #[cfg(debug_assertions)]
        {
            &mut $slice[$index]
        }
        #[cfg(not(debug_assertions))]
        {
            #[allow(unused_unsafe)]
            unsafe { $slice.get_unchecked_mut($index) }
        }
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_fast_read() {
        let pv = vec![1.0f32, 2.0, 3.0];
        let val = *fast!(pv, [2]);
        assert_eq!(val, 3.0);
    }

    #[test]
    fn test_fast_write() {
        let mut walls = vec![0u8; 5];
        fast!(walls, [2] = 7);
        assert_eq!(walls[2], 7);
    }

    #[test]
    fn test_fast_mut_accumulates() {
        let mut hv = vec![273.15f32; 3];
        *fast_mut!(hv, [1]) += 10.0;
        assert_eq!(hv[1], 283.15);
    }

    #[test]
    #[should_panic]
    #[cfg(debug_assertions)]
    fn test_fast_bounds_check_debug() {
        let pv = vec![0.0f32; 3];
        let _ = *fast!(pv, [10]); // caller contract violation panics in debug
    }
}
