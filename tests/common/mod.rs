#![allow(dead_code)]

pub mod fixtures;
pub mod recording;
pub mod strategies;

pub use fixtures::*;
pub use recording::*;
pub use strategies::*;
