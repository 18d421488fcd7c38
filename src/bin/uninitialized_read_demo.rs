// MemorySanitizer demo: reads of never-written stack memory.
// Build: RUSTFLAGS="-Zsanitizer=memory -Zsanitizer-memory-track-origins" cargo +nightly run -Zbuild-std --target <triple> --bin uninitialized-read-demo
// Unchecked, every value printed below is unspecified.

#![allow(invalid_value)]

use std::hint::black_box;
use std::mem::MaybeUninit;

use sanitizer_demos::{catalog, logging};

fn main() {
    logging::init(false);
    catalog::print_banner(catalog::UNINITIALIZED_READ_DEMO);

    // Uninitialized scalar. black_box keeps the read from being folded away.
    let x: i32 = unsafe { black_box(MaybeUninit::<i32>::uninit()).assume_init() };

    println!("Reading uninitialized variable x...");
    tracing::debug!("branching on uninitialized scalar");
    if x > 0 {
        // MSan: use-of-uninitialized-value
        println!("x is positive: {}", x);
    } else {
        println!("x is not positive: {}", x);
    }

    // Uninitialized array
    let arr: [MaybeUninit<i32>; 5] = black_box([MaybeUninit::uninit(); 5]);
    println!("\nReading uninitialized array element...");
    println!("arr[0] = {}", unsafe { arr[0].assume_init() }); // MSan: use-of-uninitialized-value

    // Partially initialized: only the first two elements are written
    let mut arr2: [MaybeUninit<i32>; 5] = [MaybeUninit::uninit(); 5];
    arr2[0].write(1);
    arr2[1].write(2);
    let arr2 = black_box(arr2);
    println!("\nReading partially initialized array...");
    println!("arr2[0] = {} (OK)", unsafe { arr2[0].assume_init() });
    println!("arr2[2] = {} (MSan will catch this!)", unsafe { arr2[2].assume_init() });
}
