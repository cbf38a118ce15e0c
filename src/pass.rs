//! Extraction of one hooked pass from a user shader buffer.
//!
//! A pass is a run of `//!` directive lines followed by shader source:
//!
//! ```text
//! //!HOOK LUMA
//! //!BIND HOOKED
//! //!WIDTH HOOKED.w 2 *
//! vec4 hook() { return HOOKED_tex(HOOKED_pos); }
//! ```
//!
//! The body runs until the next line starting with `//!`, which is where the
//! following pass begins.

use serde::Serialize;

use crate::{
    error::{EvalError, ParseError},
    options::ParserOptions,
    scan,
    szexpr::{SizeExpr, SizeLookup, SzExpToken, parse_size_expr_with},
};

/// Line prefix that marks a directive header.
pub const MARKER: &str = "//!";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShaderPass {
    /// Translation applied to the output, in output pixels.
    pub offset: [f32; 2],
    pub hook_textures: Vec<String>,
    pub bind_textures: Vec<String>,
    /// Where the output is stored; `None` overwrites the hooked texture.
    pub save_texture: Option<String>,
    pub width: SizeExpr,
    pub height: SizeExpr,
    /// Pass only runs while this evaluates to non-zero.
    pub cond: SizeExpr,
    pub components: Option<i32>,
    pub body: String,
}

impl Default for ShaderPass {
    fn default() -> Self {
        Self {
            offset: [0.0, 0.0],
            hook_textures: Vec::new(),
            bind_textures: Vec::new(),
            save_texture: None,
            width: SizeExpr::new(vec![SzExpToken::var_w("HOOKED")]),
            height: SizeExpr::new(vec![SzExpToken::var_h("HOOKED")]),
            cond: SizeExpr::new(vec![SzExpToken::Constant(1.0)]),
            components: None,
            body: String::new(),
        }
    }
}

impl ShaderPass {
    pub fn is_active<L: SizeLookup + ?Sized>(&self, lookup: &L) -> Result<bool, EvalError> {
        Ok(self.cond.eval(lookup)? != 0.0)
    }

    /// Transform from the hooked texture to this pass's output: a scale to
    /// the evaluated WIDTH/HEIGHT, shifted by OFFSET.
    pub fn output_transform<L: SizeLookup + ?Sized>(
        &self,
        lookup: &L,
        hooked_size: [f32; 2],
    ) -> Result<Transform2D, EvalError> {
        let w = self.width.eval(lookup)?;
        let h = self.height.eval(lookup)?;
        Ok(Transform2D::scale(w / hooked_size[0], h / hooked_size[1]).translated(self.offset))
    }
}

/// 2x2 matrix plus translation, column-vector convention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform2D {
    pub m: [[f32; 2]; 2],
    pub t: [f32; 2],
}

impl Transform2D {
    pub const IDENTITY: Self = Self {
        m: [[1.0, 0.0], [0.0, 1.0]],
        t: [0.0, 0.0],
    };

    pub fn scale(sx: f32, sy: f32) -> Self {
        Self {
            m: [[sx, 0.0], [0.0, sy]],
            t: [0.0, 0.0],
        }
    }

    pub fn translated(self, [tx, ty]: [f32; 2]) -> Self {
        Self {
            m: self.m,
            t: [self.t[0] + tx, self.t[1] + ty],
        }
    }

    pub fn apply(&self, [x, y]: [f32; 2]) -> [f32; 2] {
        [
            self.m[0][0] * x + self.m[1][0] * y + self.t[0],
            self.m[0][1] * x + self.m[1][1] * y + self.t[1],
        ]
    }
}

/// Parse the next pass with the default limits.
///
/// Returns `Ok(None)` once `buffer` holds no further pass, otherwise the
/// pass and the unparsed remainder to feed into the next call.
pub fn parse_pass(buffer: &str) -> Result<Option<(ShaderPass, &str)>, ParseError> {
    parse_pass_with(buffer, &ParserOptions::default())
}

pub fn parse_pass_with<'a>(
    buffer: &'a str,
    opts: &ParserOptions,
) -> Result<Option<(ShaderPass, &'a str)>, ParseError> {
    if buffer.is_empty() {
        return Ok(None);
    }

    // Skip garbage (e.g. comments) before the first header
    let Some(pos) = buffer.find(MARKER) else {
        tracing::warn!("shader appears to contain no passes");
        return Ok(None);
    };
    let mut rest = &buffer[pos..];

    let mut pass = ShaderPass::default();
    loop {
        let (line, after) = split_line(rest);
        let Some(directive) = line.trim().strip_prefix(MARKER) else {
            break;
        };
        rest = after;

        let directive = directive.trim();
        apply_directive(&mut pass, directive, opts).inspect_err(|e| {
            tracing::error!("error while parsing shader header '{directive}': {e}");
        })?;
    }

    let (body, remainder) = split_body(rest);
    pass.body = body.to_string();

    if pass.hook_textures.is_empty() {
        tracing::warn!("pass has no hooked textures (will be ignored)");
    }
    tracing::trace!(
        hooks = ?pass.hook_textures,
        save = ?pass.save_texture,
        body_len = pass.body.len(),
        "parsed user shader pass"
    );

    Ok(Some((pass, remainder)))
}

fn apply_directive(
    pass: &mut ShaderPass,
    line: &str,
    opts: &ParserOptions,
) -> Result<(), ParseError> {
    let (keyword, arg) = match line.split_once(char::is_whitespace) {
        Some((keyword, arg)) => (keyword, arg.trim()),
        None => (line, ""),
    };

    match keyword {
        "HOOK" => {
            if pass.hook_textures.len() >= opts.max_hooks {
                return Err(ParseError::CapacityExceeded {
                    what: "hooked textures",
                    limit: opts.max_hooks,
                });
            }
            pass.hook_textures.push(arg.to_string());
        }
        "BIND" => {
            if pass.bind_textures.len() >= opts.max_binds {
                return Err(ParseError::CapacityExceeded {
                    what: "bound textures",
                    limit: opts.max_binds,
                });
            }
            pass.bind_textures.push(arg.to_string());
        }
        "SAVE" => pass.save_texture = Some(arg.to_string()),
        "OFFSET" => {
            pass.offset = scan_offset(arg, opts.strict_numbers).ok_or_else(|| {
                ParseError::MalformedDirectiveArgument {
                    directive: "OFFSET",
                    line: arg.to_string(),
                }
            })?;
        }
        "WIDTH" => pass.width = parse_size_expr_with(arg, opts)?,
        "HEIGHT" => pass.height = parse_size_expr_with(arg, opts)?,
        "WHEN" => pass.cond = parse_size_expr_with(arg, opts)?,
        "COMPONENTS" => {
            let components = scan_components(arg, opts.strict_numbers).ok_or_else(|| {
                ParseError::MalformedDirectiveArgument {
                    directive: "COMPONENTS",
                    line: arg.to_string(),
                }
            })?;
            pass.components = Some(components);
        }
        _ => return Err(ParseError::UnknownDirective(line.to_string())),
    }
    Ok(())
}

/// Two leading floats; strict mode wants exactly two whole words.
fn scan_offset(arg: &str, strict: bool) -> Option<[f32; 2]> {
    let values = if strict {
        arg.split_whitespace()
            .map(|w| w.parse().ok())
            .collect::<Option<Vec<f32>>>()?
    } else {
        scan::leading_f32s(arg, 2)
    };
    match values.as_slice() {
        &[x, y] => Some([x, y]),
        _ => None,
    }
}

fn scan_components(arg: &str, strict: bool) -> Option<i32> {
    if strict {
        arg.parse().ok()
    } else {
        scan::leading_i32(arg)
    }
}

/// Split off the first line, dropping its `\n`.
fn split_line(text: &str) -> (&str, &str) {
    match text.find('\n') {
        Some(i) => (&text[..i], &text[i + 1..]),
        None => (text, ""),
    }
}

/// Split `text` before the first line that begins with the marker.
fn split_body(text: &str) -> (&str, &str) {
    let mut start = 0;
    while start < text.len() {
        let line = &text[start..];
        if line.trim_start_matches([' ', '\t']).starts_with(MARKER) {
            return text.split_at(start);
        }
        match line.find('\n') {
            Some(i) => start += i + 1,
            None => break,
        }
    }
    (text, "")
}
