use anyhow::{Result, bail};
use clap::Parser;
use std::path::{Path, PathBuf};

use biorerun::rrc3d::build_phase;
use biorerun::{BiomodModel, C3d, KinematicModel, PhaseRerun, PoseSequence, Rrc3dOptions, Settings};

/// Frames shown when a model is opened on its own.
const NEUTRAL_FRAMES: usize = 100;
const NEUTRAL_RATE: f64 = 100.0;

/// Show a `.c3d` recording or a `.bioMod` model in the rerun viewer.
#[derive(Debug, clap::Parser)]
#[clap(author, version, about)]
struct Args {
    /// `.c3d` or `.bioMod` file.
    input: PathBuf,

    #[arg(long)]
    no_floor: bool,

    #[arg(long)]
    no_force_plates: bool,

    #[arg(long)]
    no_forces: bool,

    /// Draw the path followed by every marker.
    #[arg(long)]
    trajectories: bool,

    /// Print a JSON summary instead of opening a viewer.
    #[arg(long)]
    info: bool,

    #[command(flatten)]
    rerun: rerun::clap::RerunArgs,
}

impl Args {
    /// Flags switch off what the saved settings turn on, `--trajectories` the reverse.
    fn options(&self, defaults: Rrc3dOptions) -> Rrc3dOptions {
        Rrc3dOptions {
            show_floor: defaults.show_floor && !self.no_floor,
            show_force_plates: defaults.show_force_plates && !self.no_force_plates,
            show_forces: defaults.show_forces && !self.no_forces,
            marker_trajectories: defaults.marker_trajectories || self.trajectories,
        }
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "c3d file".to_string())
}

fn show(args: &Args, name: &str, phase: &PhaseRerun) -> Result<()> {
    let (rec, _serve_guard) = args.rerun.init(name)?;
    phase.log_to(&rec)?;
    Ok(())
}

fn run_c3d(args: &Args, settings: Settings) -> Result<()> {
    let c3d = C3d::open(&args.input)?;
    if args.info {
        println!("{}", serde_json::to_string_pretty(&c3d.summary())?);
        return Ok(());
    }
    let name = file_name(&args.input);
    let options = args.options(Rrc3dOptions::from_display(&settings.display));
    let phase = build_phase(&c3d, &name, options, settings)?;
    show(args, &name, &phase)
}

fn run_biomod(args: &Args, settings: Settings) -> Result<()> {
    let model = BiomodModel::from_path(&args.input)?;
    if args.info {
        println!("{}", serde_json::to_string_pretty(&model.summary())?);
        return Ok(());
    }

    let name = model.name().to_string();
    let t_span = (0..NEUTRAL_FRAMES).map(|i| i as f64 / NEUTRAL_RATE).collect();
    let q = PoseSequence::zeros(model.nb_q(), NEUTRAL_FRAMES);
    let mut phase = PhaseRerun::new(t_span).with_settings(settings);
    phase.add_animated_model(model, q)?;
    show(args, &name, &phase)
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    log::debug!("{args:?}");
    let settings = Settings::load();

    match extension(&args.input).as_str() {
        "c3d" => run_c3d(&args, settings),
        "biomod" => run_biomod(&args, settings),
        other => bail!("unsupported file type '{other}', expected .c3d or .bioMod"),
    }
}
