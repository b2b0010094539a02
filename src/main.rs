use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use limes_rewrite::Result;
use limes_rewrite::rewrite::{Rewriter, RewriterConfig};
use limes_rewrite::spec::{RawSpec, SpecTree};
use limes_rewrite::{model, render};

#[derive(Parser)]
#[command(name = "limes-rewrite")]
#[command(about = "Algebraic optimizer for link specifications", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Report with sizes, diagnostics and the rewritten document.
    Json,
    /// Rewritten specification only, in canonical text form.
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite a specification until it stops shrinking.
    Rewrite {
        #[arg(long)]
        spec: String,

        #[arg(short = 'o', long)]
        out: Option<String>,

        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,

        #[arg(long)]
        max_iterations: Option<usize>,
    },
    /// Show the dependencies the rewriter derives for a specification.
    Inspect {
        #[arg(long)]
        spec: String,
    },
}

fn load_spec(path: &str) -> Result<SpecTree> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read spec file {}", path))?;
    RawSpec::from_json(&text)?
        .validate_and_build()
        .with_context(|| format!("invalid specification in {}", path))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Rewrite {
            spec,
            out,
            format,
            max_iterations,
        } => {
            // 1) Load + validate the specification document.
            let tree = load_spec(&spec)?;

            // 2) Rewrite. Failures degrade to the last good tree; the rewriter
            //    logs them and the JSON report carries them.
            let rewriter = Rewriter::new(RewriterConfig {
                max_iterations,
                ..RewriterConfig::default()
            });
            let rewritten = rewriter.rewrite(tree.clone());

            // 3) Render.
            let output = match format {
                Format::Json => {
                    render::render_rewrite_report(&model::build_rewrite_report(&tree, &rewritten))?
                }
                Format::Text => format!("{}\n", rewritten.tree),
            };

            match out {
                Some(path) => {
                    std::fs::write(&path, output).with_context(|| format!("write {}", path))?;
                    println!("Wrote {}", path);
                }
                None => print!("{}", output),
            }
        }
        Commands::Inspect { spec } => {
            let mut tree = load_spec(&spec)?;
            Rewriter::default().analyze(&mut tree)?;
            print!(
                "{}",
                render::render_inspect_report(&model::build_inspect_report(&tree))?
            );
        }
    }

    Ok(())
}
