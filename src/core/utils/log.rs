//! Engine logging
//!
//! Inside the worker (wasm32) messages go straight to the devtools console.
//! Native builds (tests, the threaded session host) route through `tracing`,
//! so whatever subscriber the embedding application installs picks them up.

macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        #[cfg(target_arch = "wasm32")]
        {
            web_sys::console::debug_1(&format!($($arg)*).into());
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            tracing::debug!($($arg)*);
        }
    }};
}

macro_rules! engine_info {
    ($($arg:tt)*) => {{
        #[cfg(target_arch = "wasm32")]
        {
            web_sys::console::log_1(&format!($($arg)*).into());
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            tracing::info!($($arg)*);
        }
    }};
}

macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        #[cfg(target_arch = "wasm32")]
        {
            web_sys::console::warn_1(&format!($($arg)*).into());
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            tracing::warn!($($arg)*);
        }
    }};
}

macro_rules! engine_error {
    ($($arg:tt)*) => {{
        #[cfg(target_arch = "wasm32")]
        {
            web_sys::console::error_1(&format!($($arg)*).into());
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            tracing::error!($($arg)*);
        }
    }};
}
