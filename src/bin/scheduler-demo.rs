//! Demo: queue ten slow actions on a sequential scheduler and wait for them.
//!
//! Run with `RUST_LOG=sequential_scheduler=debug` to see worker lifecycle
//! events.

use std::thread;
use std::time::Duration;

use anyhow::Context;
use sequential_scheduler::util::init_tracing_with_default;
use sequential_scheduler::{AppResult, Scheduler};

fn main() -> AppResult<()> {
    init_tracing_with_default("info");

    let scheduler = Scheduler::new();

    for i in 0..10 {
        scheduler
            .submit_fn(move || {
                println!("Exec started {i}");
                thread::sleep(Duration::from_secs(1));
                println!("Exec finished {i}");
            })
            .with_context(|| format!("submitting action {i}"))?;
    }

    scheduler.wait();

    if let Some(faults) = scheduler.faults() {
        for fault in faults.iter() {
            eprintln!("{fault}");
        }
        return Err(faults.into());
    }

    println!("End");
    Ok(())
}
