//! Pipeline stages for text-to-word-cloud generation.
//!
//! Each submodule implements one transformation step and is testable on its
//! own. [`crate::generate`] strings them together.
//!
//! ## Data Flow
//!
//! ```text
//!  text ──▶ tokenize ──▶ layout ──▶ render ──▶ encode
//! (PDF)     (counts)    (placed)   (RgbImage)  (PNG)
//!                 │
//!                 └────▶ report ──▶ chart
//!                        (top 10)   (bars)
//! ```
//!
//! 1. [`text`]     — direct text or page-by-page PDF extraction
//! 2. [`tokenize`] — the single word rule shared by cloud and table
//! 3. [`mask`], [`font`], [`colormap`] — inputs to the layout
//! 4. [`layout`]   — place words on an occupancy map, then draw them
//! 5. [`report`]   — top-word table and its CSV form
//! 6. [`chart`]    — horizontal bar chart of the table
//! 7. [`encode`]   — PNG bytes and data-URIs

pub mod chart;
pub mod colormap;
pub mod encode;
pub mod font;
pub mod layout;
pub mod mask;
pub mod report;
pub mod text;
pub mod tokenize;
