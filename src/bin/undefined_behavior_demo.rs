// Undefined behavior demo: overflow, oversized shift, out-of-bounds index.
// Check: cargo +nightly miri run --bin undefined-behavior-demo
//    or: RUSTFLAGS="-Zub-checks=yes" cargo +nightly run --release --bin undefined-behavior-demo
// Both checkers stop at the first violation; remove a step to see the next one.

use std::hint::black_box;
use std::ptr;

use sanitizer_demos::{catalog, logging};

fn main() {
    logging::init(false);
    catalog::print_banner(catalog::UNDEFINED_BEHAVIOR_DEMO);

    // Signed integer overflow
    println!("1. Signed integer overflow:");
    let x = black_box(i32::MAX);
    println!("   x = {}", x);
    tracing::debug!(x, "unchecked_add past i32::MAX");
    let x = unsafe { x.unchecked_add(1) }; // UB: i32::unchecked_add cannot overflow
    println!("   x + 1 = {} (undefined behavior)\n", x);

    // Division by zero
    println!("2. Division by zero:");
    let _numerator = 10;
    let _denominator = 0;
    // Uncomment to trigger:
    // let result = _numerator / _denominator;
    // println!("   10 / 0 = {}", result);
    println!("   (Commented out to avoid crash)\n");

    // Shift out of bounds
    println!("3. Shift out of bounds:");
    let value = 1i32;
    let shift = black_box(100u32); // wider than i32
    tracing::debug!(shift, "unchecked_shl past the bit width");
    let shifted = unsafe { value.unchecked_shl(shift) }; // UB: shift amount >= 32
    println!("   1 << 100 = {} (undefined behavior)\n", shifted);

    // Array index out of bounds
    println!("4. Array index out of bounds:");
    let arr = [1, 2, 3, 4, 5];
    let index = black_box(10usize);
    tracing::debug!(index, len = arr.len(), "get_unchecked out of bounds");
    let val = unsafe { *arr.get_unchecked(index) }; // UB: index >= len
    println!("   arr[10] = {} (undefined behavior)\n", val);

    // Null pointer dereference
    println!("5. Null pointer dereference:");
    let _ptr: *mut i32 = ptr::null_mut();
    // Uncomment to trigger:
    // unsafe { *_ptr = 42; }
    println!("   (Commented out to avoid crash)");
}
