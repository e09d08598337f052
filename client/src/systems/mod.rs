//! Client-side game systems
//!
//! Organized into submodules for maintainability.

mod frame;
mod rendering;
mod sync;
mod world;

// Re-export everything for easy access from main.rs
pub use frame::*;
pub use rendering::*;
pub use sync::*;
pub use world::*;
