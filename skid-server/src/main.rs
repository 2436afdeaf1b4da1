use std::time::Duration;

use anyhow::Context;

use skid_core::track::Track;
use skid_core::GLOBAL_CONFIG;

mod checkpoints;
mod controllers;
mod game;
mod lineup;
mod physics;
mod progress;
mod scoring;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let settings = &*GLOBAL_CONFIG;
    let track = Track::load(&settings.track_file)
        .with_context(|| format!("could not load track from {}", settings.track_file))?;

    let mut session = game::RaceSession::new(&track, settings);
    session.spawn_ai(&track, settings, settings.vehicle_amount);

    // kick off the race loop
    session.start_loop(
        Duration::from_millis(settings.server_tick_ms),
        settings.max_ticks,
        settings.realtime,
    );

    tracing::info!(ticks = session.ticks(), time = session.clock(), "race over");
    for snapshot in session.snapshots() {
        tracing::debug!(
            vehicle = snapshot.progress.vehicle,
            lap = snapshot.progress.lap,
            next_checkpoint = snapshot.progress.next_checkpoint,
            wrong_way = snapshot.progress.wrong_way,
            drift_points = snapshot.drift.total_points,
            "final position"
        );
    }

    let standings = session.standings();
    println!("{}", serde_json::to_string_pretty(&standings)?);
    Ok(())
}
