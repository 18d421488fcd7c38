// AddressSanitizer demo: stack buffer overflow, then use after free.
// Build: RUSTFLAGS="-Zsanitizer=address" cargo +nightly run -Zbuild-std --target <triple> --bin overflow-demo
// Without the sanitizer the behavior is undefined: garbage output or a crash.

use std::hint::black_box;

use sanitizer_demos::{catalog, logging};

fn main() {
    logging::init(false);
    catalog::print_banner(catalog::OVERFLOW_DEMO);

    // Stack buffer overflow
    let mut arr: [i32; 5] = [1, 2, 3, 4, 5];
    let index = black_box(10usize);

    println!("Writing to arr[10] (out of bounds)...");
    tracing::debug!(index, len = arr.len(), "out-of-bounds stack write");
    let value = unsafe {
        let slot = arr.as_mut_ptr().add(index);
        slot.write(99); // ASan: stack-buffer-overflow
        slot.read()
    };
    println!("Value at arr[10]: {}", value);

    // Use after free
    println!("\nUse after free example:");
    let ptr = Box::into_raw(Box::new(42i32));
    println!("Allocated: {}", unsafe { *ptr });
    unsafe { drop(Box::from_raw(ptr)) };
    tracing::debug!(?ptr, "read through freed box");
    println!("After drop, trying to access: {}", unsafe { ptr.read() }); // ASan: heap-use-after-free
}
