//! objview core library - model loading and the renderer-facing geometry buffer
//!
//! Parses OBJ text into a [`GeometryBuffer`] and generates procedural
//! primitives. No I/O and no GPU calls happen here: callers hand in text (or a
//! reader) and take ownership of the returned buffer.

pub mod error;
pub mod geometry;
pub mod obj;

// Re-export commonly used types
pub use error::{ColorParseError, ParseError};
pub use geometry::{
    Face, FaceCorner, GeometryBuffer, MaterialColor, Normal, TexCoord, Triangle, Vertex,
    DEFAULT_CUBE_SIZE, DEFAULT_MATERIAL_COLOR,
};
pub use obj::{parse, parse_reader};
