pub mod property;

pub use property::{ContextProperty, Prop, PropertyTier};
