use std::env;
use std::error::Error;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;

use log::{error, info};
use model::{get_config_path, load_config, ConvertConfig, Flavor, Pack};
use pack::PackTranscoder;

const USAGE: &str = "usage: circuit-convert <input.syx> <output> \
[--config <file>] [--name <name>] [--color <color>] [--flavor <flavor>]";

// Log to stderr with a timestamp, info and above unless RUST_LOG says otherwise
fn setup_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
            writeln!(
                buf,
                "[{}] [{}] {}",
                timestamp,
                record.level(),
                record.args()
            )
        })
        .target(env_logger::Target::Stderr)
        .init();
}

#[derive(Debug, Default, PartialEq)]
struct Args {
    input: PathBuf,
    output: PathBuf,
    config: Option<PathBuf>,
    name: Option<String>,
    color: Option<String>,
    flavor: Option<String>,
}

fn parse_args<I: Iterator<Item = String>>(mut args: I) -> Result<Args, String> {
    let mut parsed = Args::default();
    let mut positional = Vec::new();

    while let Some(arg) = args.next() {
        if !arg.starts_with("--") {
            positional.push(arg);
            continue;
        }

        let mut value = |flag: &str| {
            args.next()
                .ok_or_else(|| format!("missing value for {}", flag))
        };
        match arg.as_str() {
            "--config" => parsed.config = Some(PathBuf::from(value("--config")?)),
            "--name" => parsed.name = Some(value("--name")?),
            "--color" => parsed.color = Some(value("--color")?),
            "--flavor" => parsed.flavor = Some(value("--flavor")?),
            flag => return Err(format!("unknown option {}", flag)),
        }
    }

    match <[String; 2]>::try_from(positional) {
        Ok([input, output]) => {
            parsed.input = PathBuf::from(input);
            parsed.output = PathBuf::from(output);
            Ok(parsed)
        }
        Err(_) => Err(USAGE.to_string()),
    }
}

fn resolve_config(args: &Args) -> Result<ConvertConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => {
            let path = get_config_path();
            if path.exists() {
                load_config(&path)?
            } else {
                ConvertConfig::default()
            }
        }
    };

    if let Some(name) = &args.name {
        config.name = name.clone();
    }
    if let Some(color) = &args.color {
        config.color = color.clone();
    }
    if let Some(flavor) = &args.flavor {
        config.flavor = flavor.clone();
    }
    Ok(config)
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let config = resolve_config(args)?;
    let flavor: &Flavor = config
        .target_flavor()
        .ok_or_else(|| format!("unknown flavor: {}", config.flavor))?;

    let input = fs::read(&args.input)?;
    let mut pack = Pack::new(&config.name).with_color(&config.color);
    pack.read(input.as_slice())?;

    // Build into memory so a failed write leaves no file behind
    let mut archive = Vec::new();
    pack.write(&mut archive, flavor)?;

    let mut output = BufWriter::new(File::create(&args.output)?);
    output.write_all(&archive)?;
    output.flush()?;

    info!(
        "Converted {} into {} ({} patches, {} samples)",
        args.input.display(),
        args.output.display(),
        pack.patches.len(),
        pack.samples.len()
    );
    Ok(())
}

fn main() {
    setup_logging();

    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            process::exit(2);
        }
    };

    if let Err(err) = run(&args) {
        error!("Conversion failed: {}", err);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args, String> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_positional_and_flags() {
        let parsed = args(&["dump.syx", "out.zip", "--name", "Live Set", "--flavor", "circuit-tracks"]).unwrap();
        assert_eq!(parsed.input, PathBuf::from("dump.syx"));
        assert_eq!(parsed.output, PathBuf::from("out.zip"));
        assert_eq!(parsed.name.as_deref(), Some("Live Set"));
        assert_eq!(parsed.flavor.as_deref(), Some("circuit-tracks"));
        assert_eq!(parsed.color, None);
    }

    #[test]
    fn test_parse_errors() {
        assert!(args(&["dump.syx"]).is_err());
        assert!(args(&["a", "b", "c"]).is_err());
        assert!(args(&["a", "b", "--name"]).is_err());
        assert!(args(&["a", "b", "--verbose"]).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "name = \"From File\"\ncolor = \"#112233\"\n").unwrap();

        let parsed = args(&[
            "in.syx",
            "out.zip",
            "--config",
            config_path.to_str().unwrap(),
            "--name",
            "From Flag",
        ])
        .unwrap();
        let config = resolve_config(&parsed).unwrap();
        assert_eq!(config.name, "From Flag");
        assert_eq!(config.color, "#112233");
        assert_eq!(config.flavor, "circuit-tracks");
    }

    #[test]
    fn test_failed_conversion_creates_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("empty.syx");
        let output = dir.path().join("out.zip");
        fs::write(&input, b"").unwrap();

        let parsed = Args {
            input,
            output: output.clone(),
            config: None,
            name: None,
            color: None,
            flavor: Some("circuit-tracks".to_string()),
        };
        assert!(run(&parsed).is_err());
        assert!(!output.exists());
    }
}
