pub mod framefile;
pub mod overrides;

pub use framefile::{framefile_name, render_framefile, Layout, RenderOptions};
pub use overrides::OverrideStore;
