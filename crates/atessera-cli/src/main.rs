//! atx: render an atessera document to HTML or LaTeX.
//!
//! Reads the file given as the last positional argument, or stdin, and
//! writes the rendering to stdout.

use std::io::Read;
use std::path::PathBuf;

use atessera::{Feature, HtmlTarget, LatexTarget, Options};
use color_eyre::Result;
use eyre::{WrapErr, bail, eyre};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Html,
    Latex,
}

/// CLI arguments
#[derive(Debug)]
struct Args {
    format: Format,
    /// YAML options file
    config: Option<PathBuf>,
    /// Print the byte offsets of level-1 headings (HTML only)
    splits: bool,
    /// Print the bibliography after the rendering
    biblio: bool,
    ext_chars: bool,
    strip_newlines: bool,
    input: Option<PathBuf>,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args> {
    let mut parsed = Args {
        format: Format::Html,
        config: None,
        splits: false,
        biblio: false,
        ext_chars: false,
        strip_newlines: false,
        input: None,
    };

    for arg in args {
        if let Some(value) = arg.strip_prefix("--format=") {
            parsed.format = match value {
                "html" => Format::Html,
                "latex" | "tex" => Format::Latex,
                other => bail!("unknown format {other:?}, expected html or latex"),
            };
        } else if let Some(value) = arg.strip_prefix("--config=") {
            parsed.config = Some(PathBuf::from(value));
        } else if arg == "--splits" {
            parsed.splits = true;
        } else if arg == "--biblio" {
            parsed.biblio = true;
        } else if arg == "--ext-chars" {
            parsed.ext_chars = true;
        } else if arg == "--strip-newlines" {
            parsed.strip_newlines = true;
        } else if arg.starts_with("--") {
            bail!("unknown flag {arg}");
        } else if parsed.input.replace(PathBuf::from(&arg)).is_some() {
            bail!("more than one input file given");
        }
    }

    if parsed.splits && parsed.format != Format::Html {
        return Err(eyre!("--splits is only available with --format=html"));
    }
    Ok(parsed)
}

fn options(args: &Args) -> Result<Options> {
    let mut options = match &args.config {
        Some(path) => Options::load(path)?,
        None => Options::default(),
    };
    if args.ext_chars {
        options = options.with_feature(Feature::ExtChars);
    }
    if args.strip_newlines {
        options = options.with_strip_newlines(true);
    }
    Ok(options)
}

fn read_input(input: Option<&PathBuf>) -> Result<String> {
    match input {
        Some(path) => std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .wrap_err("failed to read stdin")?;
            Ok(text)
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("atessera=info".parse()?),
        )
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    let options = options(&args)?;
    let text = read_input(args.input.as_ref())?;
    tracing::debug!(format = ?args.format, bytes = text.len(), "rendering");

    let biblio = match args.format {
        Format::Html => {
            let mut target = HtmlTarget::new(options);
            if args.splits {
                let (html, splits) = target.parse_with_splits(&text);
                print!("{html}");
                for offset in splits {
                    eprintln!("split: {offset}");
                }
            } else {
                print!("{}", target.parse(&text));
            }
            target.biblio().clone()
        }
        Format::Latex => {
            let mut target = LatexTarget::new(options);
            print!("{}", target.parse(&text));
            target.biblio().clone()
        }
    };

    if args.biblio {
        for (key, text) in biblio.iter() {
            println!("[{key}] {text}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_defaults() {
        let parsed = args(&[]).unwrap();
        assert_eq!(parsed.format, Format::Html);
        assert!(parsed.input.is_none());
        assert!(!parsed.splits);
    }

    #[test]
    fn test_flags() {
        let parsed = args(&["--format=latex", "--strip-newlines", "--biblio", "book.md"]).unwrap();
        assert_eq!(parsed.format, Format::Latex);
        assert!(parsed.strip_newlines);
        assert!(parsed.biblio);
        assert_eq!(parsed.input, Some(PathBuf::from("book.md")));

        let options = options(&parsed).unwrap();
        assert!(options.strip_newlines);
        assert!(!options.has(Feature::ExtChars));
    }

    #[test]
    fn test_rejects_bad_arguments() {
        assert!(args(&["--format=pdf"]).is_err());
        assert!(args(&["--verbose"]).is_err());
        assert!(args(&["a.md", "b.md"]).is_err());
        assert!(args(&["--format=latex", "--splits"]).is_err());
    }
}
