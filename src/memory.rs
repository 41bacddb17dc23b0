/// Peak resident set size of this process, in megabytes.
///
/// Reads `ru_maxrss` from `getrusage(RUSAGE_SELF)`. Linux reports it in
/// kilobytes and macOS in bytes. Returns `0.0` if the call fails.
///
/// # Example
/// ```rust, ignore
/// use gencode_gtf::max_mem_usage_mb;
///
/// let before = max_mem_usage_mb();
/// // decode something large
/// println!("grew by {:.2} MB", max_mem_usage_mb() - before);
/// ```
pub fn max_mem_usage_mb() -> f64 {
    let mut usage = std::mem::MaybeUninit::<libc::rusage>::uninit();
    // SAFETY: getrusage fills the struct when it returns 0.
    let usage = unsafe {
        if libc::getrusage(libc::RUSAGE_SELF, usage.as_mut_ptr()) != 0 {
            return 0.0;
        }
        usage.assume_init()
    };

    let maxrss = usage.ru_maxrss as f64;
    if cfg!(target_os = "macos") {
        maxrss / (1024.0 * 1024.0)
    } else {
        maxrss / 1024.0
    }
}
