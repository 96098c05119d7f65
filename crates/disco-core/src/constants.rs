// Shared tuning constants used by both web and native frontends.

// Geometry
pub const WELD_TOLERANCE: f32 = 1e-4; // positions closer than this collapse into one vertex

// Ball appearance
pub const INNER_COLOR_RGB: [f32; 3] = [0.133, 0.133, 0.133]; // 0x222222
pub const MASCOT_INNER_COLOR_RGB: [f32; 3] = [0.271, 0.149, 0.141]; // 0x452624
pub const ATTACHMENT_COLOR_RGB: [f32; 3] = [0.4, 0.4, 0.4]; // 0x666666

// Surface
pub const MAX_PIXEL_RATIO: f32 = 2.0; // cap on devicePixelRatio for the shared surface
pub const CLEAR_COLOR_RGBA: [f64; 4] = [0.0, 0.0, 0.0, 0.0]; // transparent so the page shows through
pub const DEFAULT_TIME_SCALE: f32 = 0.1; // multiplier applied to clock deltas before animation

// Orbit controller defaults
pub const DAMPING_FACTOR: f32 = 0.05;
pub const ROTATE_SPEED: f32 = 1.0;
pub const ZOOM_SPEED: f32 = 1.0;
pub const MIN_POLAR_EPS: f32 = 1e-6; // keeps phi off the poles

// Responsive showcase scale
pub const COMPACT_BREAKPOINT_PX: f32 = 768.0;
pub const COMPACT_SCALE: f32 = 1.0;
pub const WIDE_SCALE: f32 = 1.75;

// Matcap
pub const PROCEDURAL_MATCAP_SIZE: u32 = 256;

// Geometry upper bound for primitive detail; beyond this the vertex count explodes
pub const MAX_ICOSAHEDRON_DETAIL: u32 = 64;
