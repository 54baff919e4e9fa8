mod core;

pub use self::core::{RendererSettings, StripRenderer, StripView};
