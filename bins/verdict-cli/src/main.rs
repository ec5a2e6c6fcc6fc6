mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use verdict_common::types::{DataStructureType, Language};

#[derive(Parser)]
#[command(name = "verdict-cli")]
#[command(about = "Verdict CLI - Detect signatures, generate starter code and harnesses, grade submissions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect a function signature in a problem statement or source file
    Detect {
        /// File holding the problem text or code
        file: PathBuf,
    },

    /// Generate starter code for one language
    Starter {
        /// Target language (javascript, python, cpp, java, ruby)
        #[arg(short, long)]
        language: Language,

        /// Function name
        #[arg(short, long)]
        name: String,

        /// Comma-separated parameter names
        #[arg(short, long, default_value = "")]
        params: String,

        /// Declared input type (array, number, linked-list, binary-tree, ...)
        #[arg(long, value_parser = parse_data_type)]
        input_type: Option<DataStructureType>,

        /// Declared output type
        #[arg(long, value_parser = parse_data_type)]
        output_type: Option<DataStructureType>,

        /// Sample input used to infer parameter types
        #[arg(long)]
        sample_input: Option<String>,

        /// Sample output used to infer the return type
        #[arg(long)]
        sample_output: Option<String>,
    },

    /// Print the full harness for one test case of a question
    Harness {
        /// Question JSON file
        #[arg(short, long)]
        question: PathBuf,

        /// Submission language
        #[arg(short, long)]
        language: Language,

        /// Submission source file
        #[arg(short, long)]
        code: PathBuf,

        /// Test case id (defaults to the first test case)
        #[arg(short, long)]
        test_case: Option<String>,

        /// Print the harness stdin instead of the source
        #[arg(long, default_value = "false")]
        stdin: bool,
    },

    /// Grade a submission against the configured execution service
    Grade {
        /// Question JSON file
        #[arg(short, long)]
        question: PathBuf,

        /// Submission language
        #[arg(short, long)]
        language: Language,

        /// Submission source file
        #[arg(short, long)]
        code: PathBuf,

        /// Print hidden test case results as well
        #[arg(long, default_value = "false")]
        show_hidden: bool,
    },

    /// List configured languages
    ListLangs,
}

fn parse_data_type(raw: &str) -> Result<DataStructureType, String> {
    serde_json::from_value(serde_json::Value::String(raw.trim().to_lowercase()))
        .map_err(|_| format!("unknown data structure type: {}", raw))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Detect { file } => {
            commands::detect(&file)?;
        }
        Commands::Starter {
            language,
            name,
            params,
            input_type,
            output_type,
            sample_input,
            sample_output,
        } => {
            let hints = verdict_harness::TypeHints {
                input_type,
                output_type,
                sample_input,
                sample_output,
            };
            commands::starter(language, &name, &params, &hints)?;
        }
        Commands::Harness {
            question,
            language,
            code,
            test_case,
            stdin,
        } => {
            commands::harness(&question, language, &code, test_case.as_deref(), stdin)?;
        }
        Commands::Grade {
            question,
            language,
            code,
            show_hidden,
        } => {
            commands::grade(&question, language, &code, show_hidden).await?;
        }
        Commands::ListLangs => {
            commands::list_languages()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_data_type() {
        assert_eq!(parse_data_type("binary-tree"), Ok(DataStructureType::BinaryTree));
        assert_eq!(parse_data_type(" Linked-List "), Ok(DataStructureType::LinkedList));
        assert!(parse_data_type("graph").is_err());
    }

    #[test]
    fn test_cli_parses_starter() {
        let cli = Cli::try_parse_from([
            "verdict-cli",
            "starter",
            "--language",
            "cpp",
            "--name",
            "maxDepth",
            "--params",
            "root",
            "--input-type",
            "binary-tree",
        ])
        .unwrap();
        match cli.command {
            Commands::Starter {
                language,
                input_type,
                ..
            } => {
                assert_eq!(language, Language::Cpp);
                assert_eq!(input_type, Some(DataStructureType::BinaryTree));
            }
            _ => panic!("expected starter"),
        }
    }
}
