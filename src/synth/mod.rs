mod ctor;
mod interface;

pub use ctor::{synthesize_initializer, CtorParam, Initializer};
pub use interface::{synthesize_interface, SynthInterface};
