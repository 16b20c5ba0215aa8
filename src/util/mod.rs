pub mod env;
pub mod trace;

pub use env::{Env, EnvError};
