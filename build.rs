//! Emits a `cfg` derived from the `width64`/`width128` feature selection, so
//! the rest of the crate can write `#[cfg(bitmask_width128)]` instead of
//! `#[cfg(not(feature = "width64"))]` everywhere.

fn main() {
    println!("cargo:rustc-check-cfg=cfg(bitmask_width128)");

    // width128 takes priority when requested; width64 is only the default,
    // not an exclusive selector (callers doing `--features width128` rarely
    // also pass `--no-default-features`).
    #[cfg(feature = "width128")]
    println!("cargo:rustc-cfg=bitmask_width128");
}
