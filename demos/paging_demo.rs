//! Example: Paging with a background auto-run
//!
//! Replays a reference string on a background thread and renders the frame
//! table from the event channel, the way a UI would.
//!
//! Usage: `cargo run --example paging_demo -- [fifo|lru|optimal] [trace]`

use memory_policy_sim::driver::{shared, AutoRunExt};
use memory_policy_sim::{
    parse_trace, Access, DriverConfig, PagingConfig, PagingSimulator, PagingSnapshot,
    ReplacementPolicy, RunEvent,
};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let policy = match args.next().map(|a| a.parse::<ReplacementPolicy>()) {
        Some(Ok(policy)) => policy,
        Some(Err(e)) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
        None => ReplacementPolicy::Lru,
    };
    let trace = parse_trace(
        &args
            .next()
            .unwrap_or_else(|| "7,0,1,2,0,3,0,4,2,3,0,3,2,1,2,0,1,7,0,1".to_string()),
    );

    println!("=== Paging Demo ({}) ===\n", policy);
    println!("Trace: {:?}\n", trace);

    let config = PagingConfig::with_frames(3, policy);
    let sim = shared(PagingSimulator::new(&config, trace).unwrap());

    let driver = DriverConfig {
        step_interval: Duration::from_millis(100),
        max_steps: None,
    };
    let handle = sim.auto_run(driver);

    for event in handle.events().iter() {
        match event {
            RunEvent::Step { outcome, snapshot } => {
                let marker = match outcome.access {
                    Access::Hit { .. } => "  hit".to_string(),
                    Access::Fault { evicted: Some(page), .. } => format!("FAULT (evicted {})", page),
                    Access::Fault { evicted: None, .. } => "FAULT".to_string(),
                };
                println!(
                    "step {:>2}: page {:>2} {} {:<18}",
                    outcome.step,
                    outcome.page,
                    render_frames(&snapshot),
                    marker
                );
            }
            RunEvent::Finished(reason) => {
                println!("\n🏁 Finished: {:?}", reason);
            }
        }
    }

    let guard = sim.lock();
    let snapshot = guard.snapshot();
    println!("--- Summary ---");
    println!("  Page Faults:       {}", snapshot.page_faults);
    println!("  Hits:              {}", snapshot.hits);
    println!("  Fault Rate:        {:.1}%", snapshot.fault_rate() * 100.0);
    println!("  Physical Memory:   {} units", guard.physical_memory_size());
}

fn render_frames(snapshot: &PagingSnapshot) -> String {
    snapshot
        .frames
        .iter()
        .map(|frame| {
            let page = frame
                .page_id()
                .map_or_else(|| " .".to_string(), |p| format!("{:>2}", p));
            if snapshot.highlight == Some(frame.frame_id()) {
                format!("[*{}]", page)
            } else {
                format!("[ {}]", page)
            }
        })
        .collect()
}
