use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use imgqr::{
    decode, encode, CompressorConfig, DecodeMode, DecodedResult, ECLevel, EncodeConfig,
    DEFAULT_TARGET_CAPACITY, MAX_MODULE_SIZE,
};

#[derive(Parser, Debug)]
#[command(name = "imgqr", version, about = "Embed images in QR codes and read them back")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compress an image and write a QR code PNG carrying it
    Encode {
        input: PathBuf,
        output: PathBuf,
        #[arg(
            long,
            default_value_t = DEFAULT_TARGET_CAPACITY,
            help = "Compressed size budget in bytes"
        )]
        capacity: usize,
        #[arg(long, default_value_t = 85)]
        start_quality: u8,
        #[arg(long, default_value_t = 10)]
        quality_step: u8,
        #[arg(long, default_value_t = 10)]
        min_quality: u8,
        #[arg(long, default_value_t = 0.8)]
        scale_ratio: f32,
        #[arg(long, default_value_t = 40, help = "QR version, 1 to 40")]
        qr_version: i16,
        #[arg(long, value_enum, default_value_t = EcArg::L)]
        ec_level: EcArg,
        #[arg(
            long,
            default_value_t = 10,
            value_parser = clap::value_parser!(u32).range(1..=MAX_MODULE_SIZE as i64),
            help = "Pixels per module"
        )]
        module_size: u32,
    },
    /// Read a QR code and print or save its content
    Decode {
        input: PathBuf,
        #[arg(long, value_enum, default_value_t = ModeArg::Base64)]
        mode: ModeArg,
        #[arg(long, help = "Where to write a recovered image")]
        out: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EcArg {
    L,
    M,
    Q,
    H,
}

impl From<EcArg> for ECLevel {
    fn from(ecl: EcArg) -> Self {
        match ecl {
            EcArg::L => ECLevel::L,
            EcArg::M => ECLevel::M,
            EcArg::Q => ECLevel::Q,
            EcArg::H => ECLevel::H,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Direct,
    Base64,
}

impl From<ModeArg> for DecodeMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Direct => DecodeMode::Direct,
            ModeArg::Base64 => DecodeMode::Base64,
        }
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Encode {
            input,
            output,
            capacity,
            start_quality,
            quality_step,
            min_quality,
            scale_ratio,
            qr_version,
            ec_level,
            module_size,
        } => {
            let data =
                std::fs::read(&input).with_context(|| format!("reading {}", input.display()))?;
            let compressor = CompressorConfig::new(capacity)
                .start_quality(start_quality)
                .quality_step(quality_step)
                .min_quality(min_quality)
                .scale_ratio(scale_ratio);
            let cfg = EncodeConfig::default()
                .compressor(compressor)
                .version(qr_version)
                .ec_level(ec_level.into())
                .module_size(module_size);

            let out = encode(&data, &cfg)?;
            std::fs::write(&output, &out.symbol_png)
                .with_context(|| format!("writing {}", output.display()))?;
            println!("{}", out.message());
        }
        Commands::Decode { input, mode, out } => {
            let data =
                std::fs::read(&input).with_context(|| format!("reading {}", input.display()))?;
            let res = decode(&data, mode.into())?;
            match (&res, out) {
                (DecodedResult::ImagePayload { data, .. }, Some(path)) => {
                    std::fs::write(&path, data)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("{} Saved to {}.", res.message(), path.display());
                }
                _ => println!("{}", res.message()),
            }
        }
    }
    Ok(())
}
