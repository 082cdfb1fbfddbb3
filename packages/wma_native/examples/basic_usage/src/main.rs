//! Raw WMA packet decoder.
//!
//! Reads a file of back-to-back `block_align`-sized WMA packets (as pulled out
//! of an ASF container) and writes the decoded audio as interleaved
//! little-endian 16-bit stereo PCM.
//!
//! # Usage
//!
//! ```text
//! wma_decode <FILE> --output <OUTPUT> --sample-rate 44100 --channels 2 \
//!     --bit-rate 128000 --block-align 4096 --extradata 00001f00
//! ```
//!
//! The stream parameters can also come from a JSON file:
//!
//! ```text
//! wma_decode <FILE> --output <OUTPUT> --params params.json
//! ```

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::{fs, io::Write as _, path::PathBuf};

use clap::Parser;
use moosicbox_wma_native::{CodecParams, Decoder, WMAV2_TAG};
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File of concatenated WMA packets.
    #[arg(index = 1)]
    file: PathBuf,

    /// Raw s16le output file.
    #[arg(short, long)]
    output: PathBuf,

    /// JSON file holding the stream parameters. Overrides the flags below.
    #[arg(long)]
    params: Option<PathBuf>,

    #[arg(long, default_value_t = 44_100)]
    sample_rate: u32,

    #[arg(long, default_value_t = 2)]
    channels: u8,

    #[arg(long, default_value_t = 128_000)]
    bit_rate: u32,

    #[arg(long, default_value_t = 4096)]
    block_align: u16,

    /// `0x160` for WMA v1, `0x161` for WMA v2.
    #[arg(long, default_value_t = WMAV2_TAG, value_parser = parse_tag)]
    codec_tag: u32,

    /// Codec-private data as hex.
    #[arg(long, default_value = "00001f00")]
    extradata: String,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Decoder(#[from] moosicbox_wma_native::Error),
    #[error(transparent)]
    Hex(#[from] hex::FromHexError),
}

fn parse_tag(value: &str) -> Result<u32, String> {
    let parsed = value.strip_prefix("0x").map_or_else(
        || value.parse(),
        |hex| u32::from_str_radix(hex, 16),
    );
    parsed.map_err(|e| format!("invalid codec tag '{value}': {e}"))
}

fn codec_params(args: &Args) -> Result<CodecParams, CliError> {
    if let Some(path) = &args.params {
        let json = fs::read_to_string(path)?;
        return Ok(serde_json::from_str(&json)?);
    }

    Ok(CodecParams::new(
        args.sample_rate,
        args.channels,
        args.bit_rate,
        args.block_align,
        args.codec_tag,
        hex::decode(&args.extradata)?,
    ))
}

fn main() -> Result<(), CliError> {
    pretty_env_logger::init();

    let args = Args::parse();
    let params = codec_params(&args)?;
    let mut decoder = Decoder::new(&params)?;
    let block_align = decoder.config().block_align;

    let input = fs::read(&args.file)?;
    let mut output = std::io::BufWriter::new(fs::File::create(&args.output)?);
    let mut pcm = vec![0_i16; decoder.max_output_samples()];

    let mut packets = 0_usize;
    let mut discarded = 0_usize;
    let mut samples = 0_usize;

    for packet in input.chunks(block_align) {
        packets += 1;
        match decoder.decode(packet, &mut pcm) {
            Ok(out) => {
                for sample in &pcm[..out.samples] {
                    output.write_all(&sample.to_le_bytes())?;
                }
                samples += out.samples;
            }
            Err(e) if e.is_recoverable() => {
                log::warn!("Packet {packets}: {e}");
                discarded += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
    decoder.decode(&[], &mut pcm)?;
    output.flush()?;

    log::info!(
        "Decoded {packets} packets ({discarded} discarded) into {} stereo frames",
        samples / 2
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extradata_from_args() {
        let args = Args::parse_from(["wma_decode", "in.wma", "--output", "out.pcm"]);
        let params = codec_params(&args).unwrap();
        assert_eq!(params.extradata, vec![0x00, 0x00, 0x1F, 0x00]);

        let args = Args::parse_from([
            "wma_decode",
            "in.wma",
            "--output",
            "out.pcm",
            "--extradata",
            "abc",
        ]);
        assert!(matches!(codec_params(&args), Err(CliError::Hex(_))));
    }

    #[test]
    fn test_parse_tag() {
        assert_eq!(parse_tag("0x160"), Ok(0x160));
        assert_eq!(parse_tag("353"), Ok(0x161));
        assert!(parse_tag("wma").is_err());
    }

    #[test]
    fn test_params_from_json() {
        let json = r#"{"sample_rate":22050,"channels":1,"bit_rate":20000,"block_align":512,"codec_tag":352,"extradata":[1,0]}"#;
        let params: CodecParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.codec_tag, 0x160);
        assert!(Decoder::new(&params).is_ok());
    }
}
