//! Minimal usage: a pool fed one-shot and multi-pass tasks, ticked like a
//! frame loop, then shut down.

use rondo_rs::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn main() -> Result<()> {
    let config = Config::builder().num_threads(4).build()?;
    rondo_rs::init_with_config(config)?;

    let finished = Arc::new(AtomicUsize::new(0));

    // One-shot tasks complete on their first pass.
    for i in 0..8 {
        let finished = finished.clone();
        rondo_rs::submit(OnceTask::boxed(move || {
            println!("one-shot task {} ran", i);
            finished.fetch_add(1, Ordering::SeqCst);
        }))?;
    }

    // A multi-pass task yields twice before reporting complete; each tick
    // puts it back into rotation, possibly on a different worker.
    let finished_multi = finished.clone();
    let mut remaining = 3;
    rondo_rs::submit(TaskFn::boxed(move || {
        remaining -= 1;
        println!("multi-pass task, {} passes left", remaining);
        if remaining == 0 {
            finished_multi.fetch_add(1, Ordering::SeqCst);
            true
        } else {
            false
        }
    }))?;

    // Frame loop stand-in.
    while finished.load(Ordering::SeqCst) < 9 {
        rondo_rs::tick()?;
        std::thread::sleep(Duration::from_millis(1));
    }

    rondo_rs::shutdown()?;
    println!("all tasks finished");
    Ok(())
}
