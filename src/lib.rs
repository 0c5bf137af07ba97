pub mod board;
pub mod config;
pub mod engine;
pub mod game;
pub mod moves;
pub mod piece;

#[cfg(not(target_arch = "wasm32"))]
pub mod worker;

#[cfg(target_arch = "wasm32")]
mod wasm_api;

/// When this build was made, `YYYY-MM-DD HH:MM`, or `unknown` if the build
/// host could not tell.
pub const BUILD_TIMESTAMP: &str = env!("BUILD_TIMESTAMP");
