//! al-tool: inspection front end
//!
//! Usage:
//!   al-tool ambdec <file>               - Dump a parsed .ambdec as JSON
//!   al-tool ambdec <file> --matrix      - Dump the decoder gains for the configured layout
//!   al-tool coeffs -a 30 -e 0 -s 0      - Panning coefficients for a direction
//!   al-tool presets                     - List the EAX reverb environments
//!   al-tool presets --apply hangar      - Apply one to a recording backend and show the native calls
//!   al-tool config                      - Print the effective configuration

use std::path::{Path, PathBuf};

use al_ambi::defs::{MAX_AMBI_ORDER, ambi_2d_channels_from_order, ambi_channels_from_order, order_from_mask};
use al_ambi::{AmbDecConf, DecoderMatrix, calc_angle_coeffs, make_speaker_map};
use al_core::{AlConfig, OutputLayout};
use al_eax::effects::reverb::EAXREVERB_ENVIRONMENT;
use al_eax::effects::reverb_presets::{EAXREVERB_PRESET_NAMES, EAXREVERB_PRESETS, preset_by_name};
use al_eax::guids::EAXPROPERTYID_EAX40_FX_SLOT0;
use al_eax::{Eax, RecordingBackend};
use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "al-tool", about = "Ambisonic decoder and EAX inspection")]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Layout {
    Quad,
    X51,
    X51Rear,
    X61,
    X71,
}

impl From<Layout> for OutputLayout {
    fn from(layout: Layout) -> Self {
        match layout {
            Layout::Quad => Self::Quad,
            Layout::X51 => Self::X51,
            Layout::X51Rear => Self::X51Rear,
            Layout::X61 => Self::X61,
            Layout::X71 => Self::X71,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an .ambdec file
    Ambdec {
        file: PathBuf,
        /// Print decoder gains instead of the parsed definition
        #[arg(short, long)]
        matrix: bool,
        /// Override the configured output layout
        #[arg(short, long)]
        layout: Option<Layout>,
    },
    /// Compute ambisonic panning coefficients
    Coeffs {
        /// Degrees, positive to the right
        #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
        azimuth: f32,
        /// Degrees, positive upward
        #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
        elevation: f32,
        /// Source spread in degrees
        #[arg(short, long, default_value_t = 0.0)]
        spread: f32,
        /// Only print channels up to this order
        #[arg(short, long, default_value_t = 3)]
        order: usize,
    },
    /// List the EAX reverb environment presets
    Presets {
        /// Apply a preset on FX slot 0 and print the resulting native calls
        #[arg(long)]
        apply: Option<String>,
    },
    /// Print the effective configuration
    Config,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AlConfig::load(path).with_context(|| format!("Failed to load {}", path.display()))?,
        None => AlConfig::default(),
    };

    match cli.command {
        Commands::Ambdec { file, matrix, layout } => dump_ambdec(&config, &file, matrix, layout),
        Commands::Coeffs {
            azimuth,
            elevation,
            spread,
            order,
        } => print_coeffs(azimuth, elevation, spread, order),
        Commands::Presets { apply: None } => list_presets(),
        Commands::Presets { apply: Some(name) } => apply_preset(&config, &name),
        Commands::Config => {
            println!("{}", config.to_json()?);
            Ok(())
        }
    }
}

fn dump_ambdec(config: &AlConfig, file: &Path, matrix: bool, layout: Option<Layout>) -> Result<()> {
    let conf = AmbDecConf::load(file).with_context(|| format!("Failed to parse {}", file.display()))?;
    if !matrix {
        println!("{}", serde_json::to_string_pretty(&conf)?);
        return Ok(());
    }

    let layout = layout.map_or(config.ambi.layout, OutputLayout::from);
    let map = make_speaker_map(&conf, layout).with_context(|| format!("Speakers do not fit {layout:?}"))?;

    let order = order_from_mask(conf.chan_mask).min(MAX_AMBI_ORDER);
    let in_channels = if conf.is_periphonic() {
        ambi_channels_from_order(order)
    } else {
        ambi_2d_channels_from_order(order)
    };
    log::info!("Decoding order {order} ({in_channels} inputs) onto {layout:?}");

    let decoder = DecoderMatrix::from_ambdec(
        &conf,
        in_channels,
        &map,
        config.ambi.sample_rate,
        config.ambi.allow_dual_band,
    )?;
    println!("{}", serde_json::to_string_pretty(&decoder)?);
    Ok(())
}

fn print_coeffs(azimuth: f32, elevation: f32, spread: f32, order: usize) -> Result<()> {
    if order > MAX_AMBI_ORDER {
        bail!("Order {order} above {MAX_AMBI_ORDER}");
    }
    let coeffs = calc_angle_coeffs(azimuth.to_radians(), elevation.to_radians(), spread.to_radians());
    for (acn, c) in coeffs.iter().take(ambi_channels_from_order(order)).enumerate() {
        println!("ACN {acn:2}: {c:>10.6}");
    }
    Ok(())
}

fn list_presets() -> Result<()> {
    for (name, preset) in EAXREVERB_PRESET_NAMES.iter().zip(&EAXREVERB_PRESETS) {
        println!(
            "{:2}  {:<16} size {:>5.1} m  decay {:>5.2} s",
            preset.environment, name, preset.environment_size, preset.decay_time
        );
    }
    Ok(())
}

fn apply_preset(config: &AlConfig, name: &str) -> Result<()> {
    let index = preset_by_name(name).ok_or_else(|| anyhow!("Unknown environment: {name}"))?;
    let mut eax = Eax::new(RecordingBackend::new(), &config.eax).context("Failed to create EAX state")?;

    let mut environment = (index as u32).to_ne_bytes();
    eax.try_set(
        Some(&EAXPROPERTYID_EAX40_FX_SLOT0),
        EAXREVERB_ENVIRONMENT,
        0,
        Some(&mut environment),
    )
    .with_context(|| format!("Failed to apply {name}"))?;

    println!("{}", serde_json::to_string_pretty(&EAXREVERB_PRESETS[index])?);
    for call in eax.backend().calls() {
        println!("{call:?}");
    }
    Ok(())
}
