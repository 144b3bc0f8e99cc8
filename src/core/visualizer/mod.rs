pub mod render;

pub use render::{render_all_commits, render_commit, RenderOptions};
