//! Scripted walk through one trip session: request, review, then live
//! tracking stop by stop until the itinerary is done.

use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trip_planner::TripError;
use trip_planner::config::TrackingConfig;
use trip_planner::haversine::describe_distance;
use trip_planner::model::VisitStatus;
use trip_planner::traits::{RandomJitter, SystemClock};
use trip_planner::trip::Advance;
use trip_planner::workflow::{Session, Stage, TripRequest};

#[derive(Debug, Parser)]
#[command(about = "Walk through a simulated trip with auto check-in")]
struct Args {
    /// Check-in radius in meters.
    #[arg(long, default_value_t = 100.0)]
    radius: f64,

    /// Seed for simulated movement.
    #[arg(long)]
    seed: Option<u64>,

    /// Overstay by 30 minutes at this visit id, then compress the schedule.
    #[arg(long)]
    overstay_at: Option<u32>,

    #[arg(long)]
    no_auto_checkin: bool,

    /// Print the final session as JSON.
    #[arg(long)]
    json: bool,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trip_planner=info,trip_demo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    if let Err(err) = run(&args) {
        tracing::error!("demo failed: {err}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), TripError> {
    let mut config = TrackingConfig::default().with_radius(args.radius)?;
    config.auto_checkin_enabled = !args.no_auto_checkin;

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut jitter = RandomJitter::new(rng);
    let clock = SystemClock;

    let mut session = Session::new(config);
    session.submit(TripRequest::default())?;
    for (label, percent) in session.generation_steps() {
        tracing::info!("{label} ({percent}%)");
    }
    session.finish_generation()?;
    tracing::info!(
        destination = %session.request.destination,
        visits = session.trip.total_visits(),
        "itinerary ready for review"
    );

    session.accept_itinerary()?;
    session.trip.start_tracking(&clock)?;

    while let Some(current) = session.trip.current_visit().map(|v| v.id) {
        if let Some(next) = session.trip.next_pending().map(|v| v.id) {
            if let Some(check_in) = session.trip.move_towards(next, &mut jitter, &clock)? {
                tracing::info!(
                    "checked in to {} at {} ({})",
                    check_in.location,
                    check_in.time.format("%H:%M"),
                    describe_distance(check_in.distance_m)
                );
            }
        }

        let variance = if args.overstay_at == Some(current.0) { 30 } else { 0 };
        let advance = session.complete_visit(current, variance, &clock)?;
        if let Advance::NextDay { day, .. } = advance {
            tracing::info!("starting day {day}");
        }

        if session.stage == Stage::MidTripReplan {
            let preview = session.trip.compression_plan()?;
            for (id, before, after) in &preview.adjustments {
                tracing::info!("visit {id}: {before}min -> {after}min");
            }
            session.apply_compression()?;
        }
        tracing::info!(schedule = %session.trip.schedule_status(), "progress");
    }

    let skipped = session
        .trip
        .days
        .values()
        .flat_map(|plan| plan.visits.iter())
        .filter(|v| v.status == VisitStatus::Skipped)
        .count();
    tracing::info!(finished = session.trip.is_finished(), skipped, "trip over");

    if args.json {
        match serde_json::to_string_pretty(&session) {
            Ok(json) => println!("{json}"),
            Err(err) => tracing::error!("could not serialize session: {err}"),
        }
    }
    Ok(())
}
