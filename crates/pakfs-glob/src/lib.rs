//! pakfs-glob: wildcard matching for archive and directory member names.
//!
//! Provides:
//! - **Pattern**: a wildcard pattern compiled once and matched against many
//!   member names, with optional case folding
//! - **expand_braces**: `{a,b}` alternative expansion, bounded by
//!   [`MAX_ALTERNATIVES`]
//! - **escape**: quote a literal path so it can prefix a pattern
//!
//! Member names are flat strings such as `gfx/hero.png`. The separator has
//! no special meaning here, so `*.png` matches `gfx/hero.png`.

mod pattern;

pub use pattern::{escape, expand_braces, Pattern, MAX_ALTERNATIVES};
