//! Animate a double pendulum and overlay markers computed from a noisy copy of its motion.
//!
//! Run with `cargo run --example marker_tracking`.

use anyhow::Result;
use rand::Rng;

use biorerun::{BiomodModel, KinematicModel, PhaseRerun, PoseSequence, compute_markers};

const MODEL: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/double_pendulum.bioMod");

fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    let step = if n > 1 { (stop - start) / (n - 1) as f64 } else { 0.0 };
    (0..n).map(|i| start + step * i as f64).collect()
}

fn main() -> Result<()> {
    env_logger::init();

    let nb_frames = 200;
    let nb_seconds = 1.0;
    let t_span = linspace(0.0, nb_seconds, nb_frames);

    let model = BiomodModel::from_path(MODEL)?;
    let q = PoseSequence::from_dof_major(&[
        linspace(0.0, 0.5, nb_frames),
        linspace(0.0, 0.1, nb_frames),
        linspace(0.0, 0.3, nb_frames),
    ])?;

    let mut rng = rand::thread_rng();
    let mut noisy_q = PoseSequence::zeros(model.nb_q(), 0);
    for pose in q.frames() {
        let noisy: Vec<f64> = pose.iter().map(|v| v + rng.gen_range(0.0..0.1)).collect();
        noisy_q.push(&noisy)?;
    }
    let noisy_markers = compute_markers(&model, &noisy_q)?;

    let mut phase = PhaseRerun::new(t_span);
    phase.add_animated_model(model, q)?;
    phase.add_xp_markers("noisy_markers", noisy_markers)?;
    phase.rerun("animation")?;
    Ok(())
}
