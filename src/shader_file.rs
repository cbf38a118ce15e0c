//! Walking every pass of a user shader file.

use crate::{
    error::ParseError,
    options::ParserOptions,
    pass::{ShaderPass, parse_pass_with},
};

/// Iterator over the passes of one shader buffer.
///
/// Each step feeds the remainder of the previous pass back into
/// [`parse_pass_with`]. After an error the iterator is exhausted.
pub struct ShaderPasses<'a> {
    rest: &'a str,
    opts: ParserOptions,
    done: bool,
}

impl<'a> ShaderPasses<'a> {
    pub fn new(text: &'a str, opts: ParserOptions) -> Self {
        Self {
            rest: text,
            opts,
            done: false,
        }
    }
}

impl Iterator for ShaderPasses<'_> {
    type Item = Result<ShaderPass, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match parse_pass_with(self.rest, &self.opts) {
            Ok(Some((pass, rest))) => {
                self.rest = rest;
                Some(Ok(pass))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Passes accepted from one shader file, and why parsing stopped early
/// if it did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShaderFile {
    pub passes: Vec<ShaderPass>,
    pub error: Option<ParseError>,
}

impl ShaderFile {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Parse all passes of a shader file.
///
/// Passes that hook nothing are dropped. A malformed pass, or one past
/// `max_passes`, stops the file; passes accepted before it are kept.
pub fn parse_user_shader(text: &str, opts: &ParserOptions) -> ShaderFile {
    let mut file = ShaderFile::default();
    for pass in ShaderPasses::new(text, opts.clone()) {
        let pass = match pass {
            Ok(pass) => pass,
            Err(e) => {
                file.error = Some(e);
                break;
            }
        };
        if pass.hook_textures.is_empty() {
            continue;
        }
        if file.passes.len() >= opts.max_passes {
            tracing::error!("too many user shader passes, limit is {}", opts.max_passes);
            file.error = Some(ParseError::CapacityExceeded {
                what: "shader passes",
                limit: opts.max_passes,
            });
            break;
        }
        file.passes.push(pass);
    }
    file
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_PASSES: &str = "\
// Example shader
//!HOOK LUMA
//!SAVE TMP
vec4 hook() { return HOOKED_tex(HOOKED_pos); }

//!HOOK LUMA
//!BIND TMP
vec4 hook() { return TMP_tex(TMP_pos) * 0.5; }
";

    #[test]
    fn iterates_passes_in_order() {
        let passes: Vec<_> = ShaderPasses::new(TWO_PASSES, ParserOptions::default())
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(passes.len(), 2);
        assert_eq!(passes[0].save_texture.as_deref(), Some("TMP"));
        assert_eq!(
            passes[0].body,
            "vec4 hook() { return HOOKED_tex(HOOKED_pos); }\n\n"
        );
        assert_eq!(passes[1].bind_textures, ["TMP"]);
        assert!(passes[1].body.ends_with("* 0.5; }\n"));
    }

    #[test]
    fn iterator_fuses_after_error() {
        let mut it = ShaderPasses::new(
            "//!HOOK A\na\n//!NOPE\nb\n//!HOOK C\nc\n",
            ParserOptions::default(),
        );
        assert!(it.next().unwrap().is_ok());
        assert!(it.next().unwrap().is_err());
        assert!(it.next().is_none());
    }

    #[test]
    fn hookless_passes_are_dropped() {
        let file = parse_user_shader("//!SAVE X\nx\n//!HOOK MAIN\ny\n", &ParserOptions::default());
        assert!(file.is_complete());
        assert_eq!(file.passes.len(), 1);
        assert_eq!(file.passes[0].hook_textures, ["MAIN"]);
    }

    #[test]
    fn bad_pass_keeps_earlier_passes() {
        let file = parse_user_shader(
            "//!HOOK A\na\n//!NOPE\nb\n//!HOOK C\nc\n",
            &ParserOptions::default(),
        );
        assert_eq!(file.passes.len(), 1);
        assert_eq!(file.passes[0].hook_textures, ["A"]);
        assert_eq!(file.error, Some(ParseError::UnknownDirective("NOPE".into())));
        assert!(!file.is_complete());
    }

    #[test]
    fn passes_past_the_limit_are_dropped() {
        let opts = ParserOptions {
            max_passes: 1,
            ..Default::default()
        };
        let file = parse_user_shader(TWO_PASSES, &opts);
        assert_eq!(file.passes.len(), 1);
        assert_eq!(file.passes[0].save_texture.as_deref(), Some("TMP"));
        assert_eq!(
            file.error,
            Some(ParseError::CapacityExceeded {
                what: "shader passes",
                limit: 1,
            })
        );
    }

    #[test]
    fn file_without_passes_is_empty() {
        assert_eq!(
            parse_user_shader("void main() {}", &ParserOptions::default()),
            ShaderFile::default()
        );
    }
}
