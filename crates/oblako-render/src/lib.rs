//! oblako-render: Compositor and size-bounded PNG encoding (sans-IO)
//!
//! Converts a committed [`oblako_pipeline::CloudLayout`] into final PNG
//! bytes. Rasterization and encoding only; pattern loading, fonts, and
//! output paths live in `oblako-io`.

pub mod compose;
pub mod encode;

pub use compose::compose;
pub use encode::{EncodeError, EncodeLimits, encode_png_bounded};
