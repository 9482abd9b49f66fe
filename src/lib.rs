//! # qcolor_lens
//!
//! Find `QColor(...)` constructor calls in source text, decode them into
//! colors, and write edited colors back in the notation they were found in.
//!
//! ## Quick Start
//!
//! ```rust
//! use qcolor_lens::prelude::*;
//!
//! let text = "brush = QColor('red')\npen = QColor(0, 128, 255, 64)\n";
//! let found = qcolor_lens::locator::find(text).collect::<Vec<_>>();
//! assert_eq!(found.len(), 2);
//! assert_eq!(found[1].value.css(), "rgba(0, 128, 255, 0.25)");
//!
//! let updated = qcolor_lens::edit::edit_at(
//!     &Locator::new(),
//!     text,
//!     Position::new(0, 10),
//!     &ChannelEdit::new(0.0, 0.0, 255.0, 255.0),
//!     EncodingPolicy::Preserve,
//! )
//! .unwrap();
//! assert!(updated.starts_with("brush = QColor(\"#0000ff\")"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Codec**: argument text to [`ColorValue`] and back; never clamps
//! - **Locator**: regex scan producing [`ColorMatch`]es with line/column spans
//! - **Edit**: clamps picker input and splices the re-encoded literal
//! - **`LensConfig`**: constructor name, column unit, named colors, env overrides

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod codec;
pub mod color;
pub mod config;
pub mod edit;
pub mod locator;
pub mod logging;
pub mod named;
pub mod swatch;
pub mod sync;

/// Re-exports for convenient usage
pub mod prelude {
    pub use crate::codec::{Codec, Rejection};
    pub use crate::color::{ColorEncoding, ColorValue};
    pub use crate::config::LensConfig;
    pub use crate::edit::{ChannelEdit, EditError, EncodingPolicy, Replacement};
    pub use crate::locator::{ColorMatch, ColumnUnit, Locator, Position, Span};
    pub use crate::named::NamedColors;
    pub use crate::swatch::SwatchMode;
}

// Re-export key types at crate root
pub use codec::{Codec, Rejection};
pub use color::{ColorEncoding, ColorValue};
pub use config::LensConfig;
pub use edit::{ChannelEdit, EditError, EncodingPolicy};
pub use locator::{ColorMatch, Locator, Position};
pub use logging::LensLogger;

#[cfg(feature = "tracing")]
pub use logging::LensTracingLayer;
