//! Parser for hooked user shader files.
//!
//! A user shader file holds one or more passes, each introduced by
//! `//!`-prefixed directive lines (`HOOK`, `BIND`, `SAVE`, `OFFSET`,
//! `WIDTH`, `HEIGHT`, `WHEN`, `COMPONENTS`) followed by shader source:
//!
//! - `szexpr`: RPN size expressions and their evaluation
//! - `pass`: extraction of a single pass and its output transform
//! - `shader_file`: iteration over all passes of a buffer
//! - `shader_cache`: cached loading of shader files from disk
//! - `options`: capacity limits and parser switches
//!
//! Diagnostics are emitted through `tracing`; install a subscriber to see them.

pub mod error;
pub mod options;
pub mod pass;
mod scan;
pub mod shader_cache;
pub mod shader_file;
pub mod szexpr;

pub use error::{EvalError, ParseError};
pub use options::{
    MAX_SZEXP_SIZE, ParserOptions, SHADER_MAX_BINDS, SHADER_MAX_HOOKS, SHADER_MAX_PASSES,
};
pub use pass::{MARKER, ShaderPass, Transform2D, parse_pass, parse_pass_with};
pub use shader_cache::{ShaderCache, load_user_shader, load_user_shaders};
pub use shader_file::{ShaderFile, ShaderPasses, parse_user_shader};
pub use szexpr::{
    Axis, BinaryOp, SizeExpr, SizeLookup, SzExpToken, TextureSizes, UnaryOp, parse_size_expr,
    parse_size_expr_with,
};
