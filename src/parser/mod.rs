pub mod attributes;
pub mod bulk;

pub use attributes::{scan_attributes, Attribute};
pub use bulk::{AttributeWarning, Location, Parser};
