// Test fixture: memory and concurrency patterns that should be flagged

use std::ffi::c_char;
use std::ptr;

unsafe extern "C" {
    fn strcpy(dest: *mut c_char, src: *const c_char) -> *mut c_char;
}

static mut HITS: u64 = 0;

fn record_hit() {
    unsafe {
        HITS += 1;
    }
}

fn copy_header(header: &[u8]) {
    let mut out = [0u8; 16];
    unsafe {
        ptr::copy_nonoverlapping(header.as_ptr(), out.as_mut_ptr(), header.len());
    }
}

fn copy_name(dst: *mut c_char, src: *const c_char) {
    unsafe {
        strcpy(dst, src);
    }
}

fn write_null() {
    let p: *mut u32 = ptr::null_mut();
    unsafe {
        *p = 7;
    }
}

fn leak_table() {
    let _table = Box::into_raw(vec![0u64; 256].into_boxed_slice());
}

fn read_after_free() -> i32 {
    let ptr = Box::into_raw(Box::new(5i32));
    unsafe { drop(Box::from_raw(ptr)) };
    unsafe { ptr.read() }
}
