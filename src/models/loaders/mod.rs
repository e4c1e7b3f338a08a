pub mod tex_loader;
pub mod toml_loader;

pub use tex_loader::{load_tex_file, load_tex_inputs, TexSource};
pub use toml_loader::load_configuration;
