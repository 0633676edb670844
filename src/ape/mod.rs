//! APEv2 codec: the container format's constants, item model, and the
//! parse/build pair that turns bytes into an `ApeTag` and back.

pub mod constants;
pub mod item;
pub mod tag;

pub use item::{ApeItem, ApeValue};
pub use tag::ApeTag;
