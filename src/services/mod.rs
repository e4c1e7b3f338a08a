pub mod warn_writer;

pub use warn_writer::WarnWriter;
