pub mod animation;
pub mod assets;
pub mod ball;
pub mod camera;
pub mod compositor;
pub mod constants;
pub mod controls;
pub mod facets;
pub mod geometry;
pub mod matcap;
pub mod presets;
pub mod primitives;
pub mod scene;
pub mod viewport;

pub use animation::*;
pub use assets::*;
pub use ball::*;
pub use camera::*;
pub use compositor::*;
pub use constants::*;
pub use controls::*;
pub use facets::*;
pub use geometry::*;
pub use matcap::*;
pub use presets::*;
pub use primitives::*;
pub use scene::*;
pub use viewport::*;

// Shaders bundled as string constants
pub static SOLID_WGSL: &str = include_str!("../shaders/solid.wgsl");
pub static FACET_WGSL: &str = include_str!("../shaders/facet.wgsl");
