pub mod configuration;
pub mod loaders;
pub mod question;

pub use configuration::{ConfigKey, Configuration};
pub use loaders::{load_configuration, load_tex_file, load_tex_inputs, TexSource};
pub use question::{Question, QuestionDraft, QuestionType, EOL};
