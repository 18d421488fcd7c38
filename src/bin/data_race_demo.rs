// ThreadSanitizer demo: two threads bump a shared counter with no synchronization.
// Build: RUSTFLAGS="-Zsanitizer=thread" cargo +nightly run -Zbuild-std --target <triple> --bin data-race-demo

use std::ptr;
use std::thread;

use sanitizer_demos::{catalog, logging};

const ITERATIONS: u32 = 100_000;

// Shared variable without synchronization
static mut COUNTER: i32 = 0;

fn increment() {
    for _ in 0..ITERATIONS {
        // Volatile load/store so every iteration really touches memory and
        // concurrent updates can be lost. TSan reports the race.
        unsafe {
            let current = ptr::read_volatile(&raw const COUNTER);
            ptr::write_volatile(&raw mut COUNTER, current + 1);
        }
    }
}

fn main() {
    logging::init(false);
    catalog::print_banner(catalog::DATA_RACE_DEMO);

    println!("Starting two threads that increment a shared counter...");
    println!("Initial counter: {}", unsafe { ptr::read_volatile(&raw const COUNTER) });

    let t1 = thread::spawn(increment);
    let t2 = thread::spawn(increment);
    tracing::debug!(iterations = ITERATIONS, "workers spawned");

    let results = [t1.join(), t2.join()];
    if results.iter().any(Result::is_err) {
        eprintln!("worker thread panicked");
    }

    println!("Final counter: {}", unsafe { ptr::read_volatile(&raw const COUNTER) });
    println!(
        "Expected: {}, but may be less due to race condition",
        ITERATIONS * 2
    );
    println!("TSan will report the data race!");
}
