//! # ggp-site
//!
//! Static site generator for the Global Gate Produce marketing website: a
//! landing page, a product catalog with per-product detail pages and a
//! certifications page, rendered in English and Spanish.
//!
//! # Architecture: Two-Stage Pipeline
//!
//! ```text
//! 1. Scan      content/  →  manifest.json    (TOML + Markdown → structured data)
//! 2. Generate  manifest  →  dist/            (final HTML per locale)
//! ```
//!
//! The manifest is human-readable JSON you can inspect between stages, and
//! each stage is a plain function, so tests exercise the pipeline without a
//! browser.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`reveal`] | One-shot scroll reveal: single and staggered-group schedulers behind a `Host` trait, plus a simulated host |
//! | [`scan`] | Stage 1: reads the content directory into a [`scan::Manifest`] |
//! | [`generate`] | Stage 2: renders every page for every locale with Maud |
//! | [`markup`] | Build-time reveal host that turns scheduler effects into HTML attributes |
//! | [`timeline`] | Replays a page's reveal plan against a simulated scroll |
//! | [`i18n`] | Locales and the translation catalog with default-locale fallback |
//! | [`config`] | `config.toml` loading, validation, merging, and CSS generation |
//! | [`types`] | Shared content types serialized in the manifest |
//! | [`naming`] | `NNN-name` filename convention for product ordering |
//! | [`output`] | CLI output formatting for every command |
//!
//! # Design Decisions
//!
//! ## Reveal Decisions Happen Once
//!
//! The same scheduler code runs at build time (against [`markup::MarkupHost`]),
//! in tests and in the `timeline` command (against [`reveal::sim::SimHost`]).
//! The browser script only reads the attributes the build wrote: threshold,
//! root margin and `--reveal-delay`. With `[reveal] prerender = "revealed"`
//! the build behaves like a reduced-motion visitor and ships every element
//! already revealed, with no script at all.
//!
//! ## Translations as Data
//!
//! UI copy lives in `translations/<locale>.toml`, looked up by dotted key with
//! the locale passed explicitly. A key missing from Spanish falls back to
//! English, and a key missing everywhere renders as itself, so a gap is
//! visible on the page instead of breaking the build. `ggp-site check` lists
//! both cases.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/): malformed markup
//! is a compile error and all interpolation is auto-escaped.
//!
//! ## NNN-Prefix Ordering
//!
//! Product files use a numeric prefix (`010-`, `020-`) for catalog order,
//! parsed by [`naming::parse_entry_name`]. Unnumbered products still get a
//! detail page but stay out of listings.

pub mod config;
pub mod generate;
pub mod i18n;
pub mod markup;
pub mod naming;
pub mod output;
pub mod reveal;
pub mod scan;
pub mod timeline;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
