use std::env;
use std::process::ExitCode;

use futures_util::StreamExt;
use refine_rs::{
    AnthropicModel, Critique, DEFAULT_MAX_ITERATIONS, LoopEvent, ModelGenerator, ReflectionLoop,
    SentinelCritic,
};
use tracing_subscriber::EnvFilter;

const DEFAULT_TASK: &str = "Create a Python function named `calculate_factorial`. It should \
accept a single integer `n`, calculate its factorial (n!), include a clear docstring explaining \
what the function does, return 1 for an input of 0, and raise a ValueError if the input is a \
negative number.";

const USAGE: &str = "Usage: reflect [OPTIONS] [TASK...]

Runs a bounded generate-critique-refine loop against the Anthropic API.

Options:
  -n, --max-iterations <N>  Maximum generate/critique cycles (default 3)
  -v, -vv                   Increase log verbosity (info, debug)
  -h, --help                Print this message

Environment:
  ANTHROPIC_API_KEY         Required
  ANTHROPIC_MODEL           Model id (default claude-sonnet-4-5)";

struct CliArgs {
    task: String,
    max_iterations: u32,
    verbosity: u8,
}

fn parse_args() -> Result<Option<CliArgs>, String> {
    let mut max_iterations = DEFAULT_MAX_ITERATIONS;
    let mut verbosity = 0u8;
    let mut task_parts = Vec::new();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "-n" | "--max-iterations" => {
                let value = args
                    .next()
                    .ok_or_else(|| format!("{arg} requires a value"))?;
                max_iterations = value
                    .parse()
                    .map_err(|_| format!("invalid value for {arg}: {value}"))?;
            }
            "-v" => verbosity += 1,
            "-vv" => verbosity += 2,
            _ if arg.starts_with('-') => return Err(format!("unknown option: {arg}")),
            _ => task_parts.push(arg),
        }
    }

    let task = if task_parts.is_empty() {
        DEFAULT_TASK.to_string()
    } else {
        task_parts.join(" ")
    };

    Ok(Some(CliArgs {
        task,
        max_iterations,
        verbosity,
    }))
}

fn init_logging(verbosity: u8) {
    let default_filter = match verbosity {
        0 => "refine_rs=warn",
        1 => "refine_rs=info",
        _ => "refine_rs=debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match parse_args() {
        Ok(Some(cli)) => cli,
        Ok(None) => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("error: {message}");
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    init_logging(cli.verbosity);

    let model_name =
        env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| "claude-sonnet-4-5".to_string());
    let model = match AnthropicModel::from_env(model_name) {
        Ok(model) => model,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(2);
        }
    };

    let reflection = ReflectionLoop::builder()
        .generator(ModelGenerator::new(model.clone()))
        .critic(SentinelCritic::new(model))
        .max_iterations(cli.max_iterations)
        .build();

    let mut reflection = match reflection {
        Ok(reflection) => reflection,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(2);
        }
    };

    let mut final_artifact = None;
    let mut final_status = None;

    {
        let stream = reflection.run_stream(cli.task);
        futures_util::pin_mut!(stream);

        while let Some(event) = stream.next().await {
            match event {
                Ok(LoopEvent::IterationStart { iteration }) => {
                    println!("{:=>25} ITERATION {iteration} {:=<25}", "", "");
                }
                Ok(LoopEvent::Artifact { content, .. }) => {
                    println!("\n--- Candidate ---\n{content}\n");
                }
                Ok(LoopEvent::Verdict { critique, .. }) => match &critique {
                    Critique::Accepted => println!("--- Critique ---\naccepted"),
                    rejected @ Critique::Rejected { .. } => {
                        println!("--- Critique ---\n{}", rejected.render_findings())
                    }
                },
                Ok(LoopEvent::Finished { status, iterations }) => {
                    final_status = Some((status, iterations));
                }
                Err(err) => {
                    eprintln!("error: {err}");
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    if let Some(artifact) = reflection.history().last_artifact() {
        final_artifact = Some(artifact.to_string());
    }

    match (final_artifact, final_status) {
        (Some(artifact), Some((status, iterations))) => {
            println!("{:=>30} FINAL RESULT {:=<30}", "", "");
            println!("{artifact}");
            println!("\nstatus: {status:?} after {iterations} iteration(s)");
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("error: loop produced no artifact");
            ExitCode::FAILURE
        }
    }
}
