pub mod config;
pub mod constants;
pub mod damping;
pub mod error;
pub mod gallery;
pub mod gesture;
pub mod layer;
pub mod layout;
pub mod scene;
pub mod seed;
pub mod state;
pub mod view;
pub mod wishes;

pub use config::*;
pub use damping::{BlendFactor, DampRates};
pub use error::{SceneError, SceneResult};
pub use gallery::{Debouncer, Gallery, GalleryConfig, GalleryFocus, GalleryQueue, PhotoFrames};
pub use gesture::*;
pub use layer::*;
pub use scene::*;
pub use state::*;
pub use view::*;
pub use wishes::*;
