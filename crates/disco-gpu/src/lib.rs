//! WebGPU rendering for mirrorball scenes.
//!
//! [`GpuBackend`] implements the compositor's `RenderBackend`: each ball is
//! uploaded once, and every frame each scene is replayed into its own render
//! pass restricted to that scene's viewport and scissor rectangle.

mod backend;
mod helpers;
mod mesh;

pub use backend::GpuBackend;
