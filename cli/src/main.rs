use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;
use tybuf_compiler::ast::{AstParser, JsonAstParser};
use tybuf_compiler::error::TybufError;
use tybuf_compiler::flatten::flatten_source;
use tybuf_compiler::imports::script_imports;
use tybuf_compiler::{compile_decl, GenerateOptions, GenerateResult, SchemaGenerator};

#[derive(Parser)]
#[command(name = "tybuf")]
#[command(about = "Compile type declaration trees into tybuf schemas", long_about = None)]
struct Cli {
    /// Log at debug level instead of info
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile every declaration of a single JSON syntax-tree file
    Compile {
        /// Input `.json` syntax-tree file
        #[arg(short, long)]
        input: PathBuf,

        /// Output `.json` schema file (if omitted, prints to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate the transitive schema closure of one or more entry files
    Generate {
        /// Entry files, relative to the base directory
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<String>,

        /// Directory that file keys are relative to
        #[arg(short, long, default_value = ".")]
        base_dir: PathBuf,

        /// Output `.json` file (if omitted, prints to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Previous generate output to keep encode IDs compatible with
        #[arg(short, long)]
        compatible: Option<PathBuf>,
    },
}

fn main() -> Result<(), TybufError> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Compile { input, output } => {
            let text = fs::read_to_string(input).map_err(TybufError::Io)?;
            let src = JsonAstParser.parse(&text)?;

            let imports = script_imports(&src);
            let mut result = serde_json::Map::new();
            for (name, decl) in flatten_source(&src, true) {
                let schema = compile_decl(&decl.node, &imports)?;
                result.insert(
                    name,
                    serde_json::json!({
                        "isExport": decl.is_export,
                        "schema": schema,
                    }),
                );
            }

            emit(&serde_json::Value::Object(result), output.as_deref())
        }

        Commands::Generate {
            input,
            base_dir,
            output,
            compatible,
        } => {
            let compatible: Option<GenerateResult> = match compatible {
                Some(path) => {
                    let text = fs::read_to_string(path).map_err(TybufError::Io)?;
                    Some(serde_json::from_str(&text).map_err(TybufError::Json)?)
                }
                None => None,
            };

            let generator = SchemaGenerator::new(base_dir).with_src_extension("json");
            let entries: Vec<&str> = input.iter().map(String::as_str).collect();
            let result = generator.generate(
                &entries,
                GenerateOptions {
                    filter: None,
                    compatible_result: compatible.as_ref(),
                },
            )?;

            emit(&serde_json::to_value(&result)?, output.as_deref())
        }
    }
}

fn emit(value: &serde_json::Value, output: Option<&std::path::Path>) -> Result<(), TybufError> {
    let json = serde_json::to_string_pretty(value)?;
    if let Some(path) = output {
        fs::write(path, json).map_err(TybufError::Io)?;
        println!("Wrote {}", path.display());
    } else {
        println!("{}", json);
    }
    Ok(())
}
