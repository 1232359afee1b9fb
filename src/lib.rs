pub mod classify;
pub mod dataset;
pub mod error;
pub mod experiment;
pub mod mnist;
pub mod report;
pub mod sample;

pub use error::{Error, Result};

pub type Label = usize;
pub type Feature = f32;
