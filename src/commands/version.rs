//! Command: print version information.

/// Version string, overridable at build time with `DEVSETUP_VERSION`.
#[must_use]
pub fn current() -> &'static str {
    option_env!("DEVSETUP_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the devsetup version to stdout.
pub fn run() {
    println!("devsetup {}", current());
}
