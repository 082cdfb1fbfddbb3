#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Fixed-point WMA v1/v2 audio decoder.
//!
//! Every stage of the pipeline runs on integer arithmetic: bitstream and VLC
//! parsing, exponent and coefficient reconstruction, noise substitution, the
//! split-radix FFT behind the inverse MDCT, and windowed overlap-add.
//!
//! ```rust,no_run
//! use moosicbox_wma_native::{CodecParams, Decoder, WMAV2_TAG};
//!
//! # fn main() -> moosicbox_wma_native::Result<()> {
//! let params = CodecParams::new(44_100, 2, 128_000, 4096, WMAV2_TAG, vec![0, 0, 0x1F, 0]);
//! let mut decoder = Decoder::new(&params)?;
//! let mut pcm = vec![0_i16; decoder.max_output_samples()];
//!
//! let packet = vec![0_u8; 4096];
//! let out = decoder.decode(&packet, &mut pcm)?;
//! println!("{} samples from {} bytes", out.samples, out.bytes_consumed);
//! # Ok(())
//! # }
//! ```

pub mod bands;
pub mod bitstream;
pub mod config;
pub mod decoder;
pub mod error;
pub mod fft;
pub mod fixed;
pub mod frame;
pub mod lsp;
pub mod mdct;
pub mod pcm;
pub mod spectrum;
pub mod superframe;
pub mod tables;
pub mod vlc;
pub mod window;

pub use config::{CodecParams, DecoderConfig, WMAV1_TAG, WMAV2_TAG};
pub use decoder::{DecodeOutput, Decoder};
pub use error::{Error, Result};
