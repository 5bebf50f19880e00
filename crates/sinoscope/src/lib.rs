//! Sinusoidal-field image generator.
//!
//! Every pixel samples a truncated series of sines and cosines over the
//! square `[-2π, 2π]²`, squashes the sum through `atan` and maps it onto a
//! banded colour palette. The same field can be computed three ways:
//!
//! - `serial`: a plain row loop on the calling thread,
//! - `openmp`: rows split across the rayon thread pool,
//! - `opencl`: a wgpu compute shader whose output is read back into the
//!   RGB buffer.
//!
//! [`Sinoscope`] implements [`viewer::Generator`], so the viewer can swap
//! variants and adjust the series order while frames are being produced.

mod config;
mod cpu;
mod error;
mod field;
mod gpu;
mod generator;

pub use config::SinoscopeConfig;
pub use error::SinoscopeError;
pub use generator::Sinoscope;
