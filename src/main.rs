use std::path::PathBuf;

use anyhow::{Result, anyhow};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use user_shaders::{ParserOptions, ShaderCache, ShaderPass, load_user_shader};

#[derive(Debug, Default, Clone)]
struct Cli {
    json: bool,
    strict: bool,
    limits: Option<PathBuf>,
    shaders: Vec<PathBuf>,
}

fn parse_cli(args: &[String]) -> Result<Cli> {
    let mut cli = Cli::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--json" => {
                cli.json = true;
                i += 1;
            }
            "--strict" => {
                cli.strict = true;
                i += 1;
            }
            "--limits" => {
                let Some(v) = args.get(i + 1) else {
                    return Err(anyhow!("missing value for --limits"));
                };
                cli.limits = Some(PathBuf::from(v));
                i += 2;
            }
            other if other.starts_with("--") => {
                return Err(anyhow!(
                    "unknown argument: {other} (supported: --json, --strict, --limits <file.json>, <shader>...)"
                ));
            }
            path => {
                cli.shaders.push(PathBuf::from(path));
                i += 1;
            }
        }
    }
    if cli.shaders.is_empty() {
        return Err(anyhow!("no shader files given"));
    }
    Ok(cli)
}

fn parser_options(cli: &Cli) -> Result<ParserOptions> {
    let mut opts = match &cli.limits {
        Some(path) => ParserOptions::from_json_file(path)?,
        None => ParserOptions::default(),
    };
    opts.strict_operators |= cli.strict;
    opts.strict_numbers |= cli.strict;
    Ok(opts)
}

#[derive(Serialize)]
struct FileReport<'a> {
    path: String,
    passes: &'a [ShaderPass],
    /// Why parsing stopped before the end of the file.
    error: Option<String>,
}

fn describe_pass(index: usize, pass: &ShaderPass) -> String {
    let save = pass.save_texture.as_deref().unwrap_or("-");
    let components = pass
        .components
        .map(|c| c.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "pass {index}: hook=[{}] bind=[{}] save={save} components={components} offset={:?} body={} bytes",
        pass.hook_textures.join(", "),
        pass.bind_textures.join(", "),
        pass.offset,
        pass.body.len(),
    )
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("user_shaders=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = parse_cli(&args)?;
    let opts = parser_options(&cli)?;
    let cache = ShaderCache::new();

    let mut parsed = Vec::with_capacity(cli.shaders.len());
    for path in &cli.shaders {
        parsed.push((path, load_user_shader(&cache, path, &opts)?));
    }

    if cli.json {
        let reports: Vec<FileReport> = parsed
            .iter()
            .map(|(path, file)| FileReport {
                path: path.display().to_string(),
                passes: &file.passes,
                error: file.error.as_ref().map(|e| e.to_string()),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for (path, file) in &parsed {
            println!("{} ({} passes)", path.display(), file.passes.len());
            for (i, pass) in file.passes.iter().enumerate() {
                println!("  {}", describe_pass(i, pass));
            }
            if let Some(e) = &file.error {
                println!("  stopped: {e}");
            }
        }
    }

    if parsed.iter().any(|(_, file)| !file.is_complete()) {
        return Err(anyhow!("some user shaders could not be fully parsed"));
    }
    Ok(())
}
