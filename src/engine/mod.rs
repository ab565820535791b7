// Engine modules: input, device backends, frame timing

pub mod backends;
pub mod input;
pub mod timing;
