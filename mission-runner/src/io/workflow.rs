//! GitHub Actions workflow commands written to stdout.
//!
//! These lines are the product-facing log of a run: the Actions UI turns
//! `::error::`/`::warning::` into annotations and folds `::group::` blocks.

use std::fmt::Display;

/// Fatal condition; the run exits non-zero.
pub fn error(message: impl Display) {
    println!("::error::{message}");
}

/// Recoverable condition; does not change the exit code by itself.
pub fn warning(message: impl Display) {
    println!("::warning::{message}");
}

/// Only shown when step debug logging is enabled on the workflow.
pub fn debug(message: impl Display) {
    println!("::debug::{message}");
}

/// Plain progress line.
pub fn notice(message: impl Display) {
    println!("{message}");
}

/// Folded log section; closed when the guard drops.
#[must_use = "the group closes as soon as the guard is dropped"]
pub struct Group(());

/// Open a `::group::` that ends with `::endgroup::` when the returned guard drops,
/// including on early returns through `?`.
pub fn group(title: impl Display) -> Group {
    println!("::group::{title}");
    Group(())
}

impl Drop for Group {
    fn drop(&mut self) {
        println!("::endgroup::");
    }
}
