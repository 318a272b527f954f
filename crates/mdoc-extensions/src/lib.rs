//! Fenced-block dialect extractors.
//!
//! Each extractor scans the raw markdown for one fenced-block dialect
//! and replaces every block with an opaque HTML placeholder before the
//! markdown converter runs. The payload-carrying dialects (mermaid,
//! glsl, desmos, geogebra, p5js) share one generic [`BlockScanner`]
//! engine parameterized by a [`DialectSpec`]; math, hints and the
//! embed dialects have their own grammars.
//!
//! All extractor state (placeholder counters, math side-tables) is
//! scoped to a single render call; nothing is shared across documents.

mod dialect;
mod embed;
mod hint;
mod math;
mod payload;
mod scanner;

pub use dialect::{BLOCK_DIALECTS, DESMOS, DialectSpec, GEOGEBRA, GLSL, MERMAID, P5JS};
pub use embed::{process_iframes, process_videos};
pub use hint::{HintKind, process_hints};
pub use math::MathExtractor;
pub use payload::{PayloadError, decode_payload, encode_payload};
pub use scanner::BlockScanner;
