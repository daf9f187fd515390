pub mod container;

pub use container::{ContextPropertyContainer, SentRecord};
