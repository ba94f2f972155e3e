// Shared tuning constants used by both web and native frontends.

// Blend damping (per second). Outward is slower so the burst holds tension,
// the return is faster so the tree snaps back together.
pub const EXPLODE_RATE: f32 = 3.0;
pub const GATHER_RATE: f32 = 6.0;

// Blend factor below which a layer is treated as fully at rest
pub const BLEND_EPSILON: f32 = 0.001;

// Gesture timing
pub const GESTURE_DEBOUNCE_SEC: f32 = 0.1; // raw hand-closed must hold this long
pub const INFERENCE_INTERVAL_MS: f64 = 100.0; // at most ~10 inferences per second
pub const HAND_LANDMARK_INDEX: usize = 9; // middle-finger MCP, steadiest palm point

// View controller
pub const HAND_DEADZONE: f32 = 0.05;
pub const YAW_GAIN: f32 = 0.8; // fraction of PI reached at full hand offset
pub const VIEW_DAMP_RATE: f32 = 2.0;
pub const AUTO_ROTATE_SPEED: f32 = 0.1; // rad/s when gesture mode is off
pub const ASSEMBLY_SCALE: f32 = 0.8;
pub const ASSEMBLY_EXPLODED_SCALE_RATIO: f32 = 0.6;
pub const ASSEMBLY_OFFSET_Y: f32 = -1.0;

// Tree dimensions
pub const TREE_HEIGHT: f32 = 10.0;
pub const TREE_RADIUS: f32 = 3.5;

// Shared breathing motion so every layer moves in phase
pub const FLOAT_FREQUENCY: f32 = 0.5;
pub const FLOAT_AMPLITUDE: f32 = 0.08;

// Particle counts
pub const DEEP_COUNT: usize = 2_000;
pub const SHINE_COUNT: usize = 8_000;
pub const GLOW_COUNT: usize = 30_000;
pub const RIBBON_COUNT: usize = 2_000;
pub const GEM_COUNT: usize = 100;
pub const SPARKLE_COUNT: usize = 18;
pub const SNOW_COUNT: usize = 600;

// Seed offsets keep dispersed hashes of different layers uncorrelated
pub const SHINE_SEED_OFFSET: u32 = 1_000;

// Photo gallery
pub const PHOTO_COUNT: usize = 9;
pub const PHOTO_REST_SCALE: f32 = 0.3;
pub const PHOTO_DISPERSED_SCALE: f32 = 1.0;
pub const PHOTO_MOVE_RATE: f32 = 6.0;
pub const PHOTO_FOCUS_RATE: f32 = 12.0;
pub const PHOTO_FOCUS_DISTANCE: f32 = 1.0; // in front of the camera
pub const PHOTO_FOCUS_FILL: f32 = 0.98; // share of the viewport a focused photo covers
pub const PHOTO_FRAME_WIDTH: f32 = 1.1;
pub const PHOTO_FRAME_HEIGHT: f32 = 1.6;
pub const PHOTO_DISPERSED_CENTER_Y: f32 = 2.5;

// Wishes
pub const WISH_NAME_MAX_CHARS: usize = 20;
pub const WISH_MESSAGE_MAX_CHARS: usize = 100;
pub const WISH_LIST_LIMIT: usize = 20;
pub const WISH_ORBIT_LIMIT: usize = 10;
pub const WISH_ORBIT_SPEED: f32 = 0.2;

// Camera
pub const CAMERA_Z: f32 = 15.0;
pub const CAMERA_FOV_DEG: f32 = 50.0;

// Post-processing defaults
pub const BLOOM_STRENGTH: f32 = 1.0;
pub const BLOOM_THRESHOLD: f32 = 0.9;

// Palette (0xRRGGBB)
pub const DEEP_BASE: u32 = 0x66_00_33;
pub const VIVID_PINK: u32 = 0xFF_14_93;
pub const DREAMY_PINK: u32 = 0xFF_69_B4;
pub const LUXURY_GOLD: u32 = 0xFF_D7_00;
pub const CHAMPAGNE: u32 = 0xF7_E7_CE;
pub const ROSE_GOLD: u32 = 0xB7_6E_79;
pub const WHITE: u32 = 0xFF_FF_FF;
pub const PHOTO_BORDER: u32 = 0xF5_F5_F5;

/// Unpack a `0xRRGGBB` literal into unit floats.
pub fn hex_rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xFF) as f32 / 255.0,
        ((hex >> 8) & 0xFF) as f32 / 255.0,
        (hex & 0xFF) as f32 / 255.0,
    ]
}
