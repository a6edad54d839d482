//! A CHIP-8 interpreter backend.
//!
//! The crate contains the machine itself ([`chip8::ChipSet`]) together with the
//! devices it owns ([`memory::Memory`], [`display::Framebuffer`],
//! [`devices::Keypad`]) and the glue needed to drive it from a background
//! thread ([`runner`]).
pub mod chip8;
pub mod definitions;
pub mod devices;
pub mod display;
pub mod memory;
pub mod opcode;
pub mod resources;
pub mod runner;
pub mod timer;
mod config;
mod error;

// reexporting for convinience
pub use config::*;
pub use error::*;
