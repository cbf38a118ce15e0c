use user_shaders::{
    BinaryOp, ParseError, ParserOptions, SHADER_MAX_HOOKS, ShaderPass, SzExpToken, parse_pass,
    parse_pass_with, parse_user_shader,
};

#[test]
fn two_passes_then_end_of_input() {
    let buffer = "//!HOOK MAIN\n//!BIND MAIN\nshader code\n//!HOOK NEXT\nmore code";

    let (first, rest) = parse_pass(buffer).unwrap().unwrap();
    assert_eq!(first.hook_textures, ["MAIN"]);
    assert_eq!(first.bind_textures, ["MAIN"]);
    assert_eq!(first.body, "shader code\n");
    assert_eq!(rest, "//!HOOK NEXT\nmore code");

    let (second, rest) = parse_pass(rest).unwrap().unwrap();
    assert_eq!(second.hook_textures, ["NEXT"]);
    assert!(second.bind_textures.is_empty());
    assert_eq!(second.body, "more code");
    assert_eq!(rest, "");

    assert_eq!(parse_pass(rest), Ok(None));
}

#[test]
fn single_directive_touches_only_its_field() {
    let defaults = ShaderPass::default();
    let cases: Vec<(&str, ShaderPass)> = vec![
        (
            "//!HOOK LUMA",
            ShaderPass {
                hook_textures: vec!["LUMA".into()],
                ..defaults.clone()
            },
        ),
        (
            "//!BIND HOOKED",
            ShaderPass {
                bind_textures: vec!["HOOKED".into()],
                ..defaults.clone()
            },
        ),
        (
            "//!SAVE PREV",
            ShaderPass {
                save_texture: Some("PREV".into()),
                ..defaults.clone()
            },
        ),
        (
            "//!OFFSET 1 2",
            ShaderPass {
                offset: [1.0, 2.0],
                ..defaults.clone()
            },
        ),
        (
            "//!WIDTH 640",
            ShaderPass {
                width: vec![SzExpToken::Constant(640.0)].into(),
                ..defaults.clone()
            },
        ),
        (
            "//!HEIGHT HOOKED.h 2 /",
            ShaderPass {
                height: vec![
                    SzExpToken::var_h("HOOKED"),
                    SzExpToken::Constant(2.0),
                    SzExpToken::BinaryOp(BinaryOp::Div),
                ]
                .into(),
                ..defaults.clone()
            },
        ),
        (
            "//!WHEN 0",
            ShaderPass {
                cond: vec![SzExpToken::Constant(0.0)].into(),
                ..defaults.clone()
            },
        ),
        (
            "//!COMPONENTS 1",
            ShaderPass {
                components: Some(1),
                ..defaults.clone()
            },
        ),
    ];

    for (line, expected) in cases {
        let (pass, rest) = parse_pass(line).unwrap().unwrap();
        assert_eq!(pass, expected, "{line}");
        assert_eq!(rest, "");
    }
}

#[test]
fn offset_with_one_float_is_malformed() {
    assert_eq!(
        parse_pass("//!HOOK MAIN\n//!OFFSET 1\n"),
        Err(ParseError::MalformedDirectiveArgument {
            directive: "OFFSET",
            line: "1".into(),
        })
    );
}

#[test]
fn one_hook_past_capacity_fails() {
    let at_limit: String = (0..SHADER_MAX_HOOKS)
        .map(|i| format!("//!HOOK TEX{i}\n"))
        .collect();
    let (pass, _) = parse_pass(&at_limit).unwrap().unwrap();
    assert_eq!(pass.hook_textures.len(), SHADER_MAX_HOOKS);
    assert_eq!(pass.hook_textures[0], "TEX0");

    let over_limit = format!("{at_limit}//!HOOK ONE_TOO_MANY\n");
    assert_eq!(
        parse_pass(&over_limit),
        Err(ParseError::CapacityExceeded {
            what: "hooked textures",
            limit: SHADER_MAX_HOOKS,
        })
    );
}

#[test]
fn custom_limits_apply_to_size_expressions() {
    let opts = ParserOptions {
        max_szexp_size: 2,
        ..Default::default()
    };
    assert!(parse_pass_with("//!HOOK MAIN\n//!WIDTH HOOKED.w 2\n", &opts).is_ok());
    assert_eq!(
        parse_pass_with("//!HOOK MAIN\n//!WIDTH HOOKED.w 2 *\n", &opts),
        Err(ParseError::CapacityExceeded {
            what: "size expression",
            limit: 2,
        })
    );
}

#[test]
fn error_in_later_pass_stops_the_file_but_keeps_earlier_passes() {
    let text = "//!HOOK MAIN\nok\n//!HOOK MAIN\n//!COMPONENTS x\nbad\n//!HOOK LAST\nlast\n";
    let file = parse_user_shader(text, &ParserOptions::default());
    assert_eq!(file.passes.len(), 1);
    assert_eq!(file.passes[0].body, "ok\n");
    assert!(matches!(
        file.error,
        Some(ParseError::MalformedDirectiveArgument {
            directive: "COMPONENTS",
            ..
        })
    ));
}

#[test]
fn numeric_arguments_tolerate_trailing_comments() {
    let text = "//!HOOK MAIN\n//!OFFSET 0.5 0.5 // px\n//!COMPONENTS 2 // rgba\n//!WIDTH 2x HOOKED.w *\nbody\n";
    let (pass, _) = parse_pass(text).unwrap().unwrap();
    assert_eq!(pass.offset, [0.5, 0.5]);
    assert_eq!(pass.components, Some(2));
    assert_eq!(pass.width.tokens()[0], SzExpToken::Constant(2.0));

    let strict = ParserOptions {
        strict_numbers: true,
        ..Default::default()
    };
    assert!(matches!(
        parse_pass_with(text, &strict),
        Err(ParseError::MalformedDirectiveArgument {
            directive: "OFFSET",
            ..
        })
    ));
}

#[test]
fn crlf_files_parse() {
    let text = "//!HOOK MAIN\r\n//!SAVE OUT\r\nbody\r\n//!HOOK OUT\r\nbody2\r\n";
    let file = parse_user_shader(text, &ParserOptions::default());
    assert!(file.is_complete());
    let passes = file.passes;
    assert_eq!(passes.len(), 2);
    assert_eq!(passes[0].save_texture.as_deref(), Some("OUT"));
    assert_eq!(passes[0].body, "body\r\n");
    assert_eq!(passes[1].hook_textures, ["OUT"]);
}

#[test]
fn passes_serialize_to_json() {
    let (pass, _) = parse_pass("//!HOOK MAIN\n//!WIDTH HOOKED.w 2 *\nbody\n")
        .unwrap()
        .unwrap();
    let json = serde_json::to_value(&pass).unwrap();
    assert_eq!(json["hook_textures"], serde_json::json!(["MAIN"]));
    assert_eq!(
        json["width"],
        serde_json::json!([
            {"Variable": {"name": "HOOKED", "axis": "Width"}},
            {"Constant": 2.0},
            {"BinaryOp": "Mul"}
        ])
    );
    assert_eq!(json["save_texture"], serde_json::Value::Null);
}
