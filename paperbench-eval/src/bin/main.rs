//! CLI for generating and grading QA benchmarks from reference papers.

use chrono::Local;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use paperbench_core::{LlmConfig, OpenAiClient};
use paperbench_eval::{
    papers, Dataset, EvalConfig, EvalHarness, EvalProgress, GenerateConfig, Generator,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

/// Generate and grade QA benchmarks from reference papers.
#[derive(Parser, Debug)]
#[command(name = "paperbench")]
#[command(about = "Generate QA benchmarks from papers and grade model answers against them")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// OpenAI API key (can also use OPENAI_API_KEY env var)
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Capability request timeout in seconds
    #[arg(long, default_value = "120", global = true)]
    llm_timeout: u64,

    /// Maximum retries for transient capability failures
    #[arg(long, default_value = "2", global = true)]
    retries: u32,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a QA benchmark from one or more papers
    Generate {
        /// Paper path(s); more than one switches to the multi-paper prompt
        #[arg(long = "paper", required = true, num_args = 1..)]
        papers: Vec<PathBuf>,

        /// Instruction prompt for single-paper generation
        #[arg(long, default_value = "prompts/prompt_qa_gen.txt")]
        prompt: PathBuf,

        /// Instruction prompt for multi-paper (cross-paper) generation
        #[arg(long, default_value = "prompts/prompt_qa_gen_multi.txt")]
        prompt_multi: PathBuf,

        /// Model for QA generation
        #[arg(long, default_value = "gpt-4o")]
        model: String,

        /// Directory to write outputs
        #[arg(long, default_value = "out")]
        out_dir: PathBuf,

        /// Prefix for item identifiers
        #[arg(long, default_value = "Q")]
        id_prefix: String,

        /// Cap the number of QA items kept
        #[arg(long)]
        max_items: Option<usize>,

        /// Also write a text export with a `Papers:` header line
        #[arg(long)]
        export_text: bool,
    },

    /// Evaluate a dataset: answer each question, judge against the gold answer
    Evaluate {
        /// Paper path(s); if omitted, inferred from the dataset container
        #[arg(long = "paper")]
        papers: Vec<PathBuf>,

        /// Dataset path (.json, .txt, or .md)
        #[arg(long)]
        dataset: PathBuf,

        /// Instruction prompt for answering
        #[arg(long, default_value = "prompts/prompt_answer.txt")]
        prompt_answer: PathBuf,

        /// Answering prompt used instead when more than one paper is in play
        #[arg(long)]
        prompt_answer_multi: Option<PathBuf>,

        /// Instruction prompt for judging
        #[arg(long, default_value = "prompts/prompt_eval.txt")]
        prompt_judge: PathBuf,

        /// Model for answering
        #[arg(long, default_value = "gpt-5")]
        answer_model: String,

        /// Model for judging
        #[arg(long, default_value = "gpt-5")]
        judge_model: String,

        /// Report path; defaults to <out-dir>/results_<timestamp>.json
        #[arg(long)]
        out: Option<PathBuf>,

        /// Directory for the default report path
        #[arg(long, default_value = "out")]
        out_dir: PathBuf,

        /// Name the default report results_latest.json instead of timestamping
        #[arg(long)]
        no_timestamp: bool,
    },
}

impl Args {
    fn llm_config(&self) -> LlmConfig {
        LlmConfig::default()
            .with_timeout(Duration::from_secs(self.llm_timeout))
            .with_max_retries(self.retries)
    }

    fn client(&self) -> Result<OpenAiClient, String> {
        let api_key = self.api_key.clone().unwrap_or_default();
        OpenAiClient::new(api_key, self.llm_config()).map_err(|e| e.to_string())
    }
}

fn load_prompt(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read prompt file {}: {}", path.display(), e))
}

async fn run_generate(args: &Args) -> Result<(), String> {
    let Command::Generate {
        papers,
        prompt,
        prompt_multi,
        model,
        out_dir,
        id_prefix,
        max_items,
        export_text,
    } = &args.command
    else {
        unreachable!()
    };

    let prompt_single = load_prompt(prompt)?;
    let prompt_multi = load_prompt(prompt_multi)?;
    let client = args.client()?;

    let mut config = GenerateConfig::new(model).with_id_prefix(id_prefix);
    if let Some(cap) = max_items {
        config = config.with_max_items(*cap);
    }

    let generator = Generator::new(config);
    let generation = generator
        .generate(&client, papers, &prompt_single, &prompt_multi)
        .await
        .map_err(|e| e.to_string())?;

    if generation.dataset.items.is_empty() {
        eprintln!("Warning: no QA pairs extracted; the dataset will be rejected by evaluation");
    }

    let json_path = generator
        .write_json(&generation, out_dir)
        .await
        .map_err(|e| e.to_string())?;
    println!(
        "Wrote {} ({} items)",
        json_path.display(),
        generation.dataset.items.len()
    );

    if *export_text {
        let text_path = generator
            .write_text_export(&generation, out_dir)
            .await
            .map_err(|e| e.to_string())?;
        println!("Wrote {}", text_path.display());
    }

    Ok(())
}

async fn run_evaluate(args: &Args) -> Result<(), String> {
    let Command::Evaluate {
        papers: explicit_papers,
        dataset,
        prompt_answer,
        prompt_answer_multi,
        prompt_judge,
        answer_model,
        judge_model,
        out,
        out_dir,
        no_timestamp,
    } = &args.command
    else {
        unreachable!()
    };

    let resolved = papers::resolve(explicit_papers, dataset).map_err(|e| e.to_string())?;
    let loaded = Dataset::load(dataset).await.map_err(|e| e.to_string())?;

    // Prompt choice follows document count, same policy as generation.
    let answer_prompt_path = match prompt_answer_multi {
        Some(multi) if resolved.len() > 1 => multi,
        _ => prompt_answer,
    };
    let answer_prompt = load_prompt(answer_prompt_path)?;
    let judge_prompt = load_prompt(prompt_judge)?;

    let client = args.client()?;
    let harness = EvalHarness::new(EvalConfig::new(answer_model, judge_model));

    let progress_bar = ProgressBar::new(0);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .expect("valid progress template")
            .progress_chars("#>-"),
    );

    let report = harness
        .evaluate_with_progress(
            &client,
            &resolved,
            &loaded,
            &answer_prompt,
            &judge_prompt,
            |progress| match progress {
                EvalProgress::Started { total } => {
                    progress_bar.set_length(total as u64);
                    progress_bar.set_message("Evaluating...");
                }
                EvalProgress::ItemCompleted {
                    completed, correct, ..
                } => {
                    progress_bar.set_position(completed as u64);
                    if !correct {
                        progress_bar.set_message("(some incorrect)");
                    }
                }
                _ => {} // Handle future variants gracefully
            },
        )
        .await
        .map_err(|e| e.to_string())?;
    progress_bar.finish_with_message("Complete");

    let out_path = match out {
        Some(path) => path.clone(),
        None => {
            std::fs::create_dir_all(out_dir)
                .map_err(|e| format!("Failed to create {}: {}", out_dir.display(), e))?;
            let name = if *no_timestamp {
                "results_latest.json".to_string()
            } else {
                format!("results_{}.json", Local::now().format("%Y-%m-%d_%H-%M-%S"))
            };
            out_dir.join(name)
        }
    };

    report
        .write_json(&out_path)
        .map_err(|e| format!("Failed to write report {}: {}", out_path.display(), e))?;

    report.print_summary();
    println!("\nDetailed results written to: {}", out_path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let result = match args.command {
        Command::Generate { .. } => run_generate(&args).await,
        Command::Evaluate { .. } => run_evaluate(&args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
