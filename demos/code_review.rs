use std::env;
use std::error::Error;

use refine_rs::{AnthropicModel, ModelGenerator, ReflectionLoop, SentinelCritic};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let task = env::args().skip(1).collect::<Vec<_>>().join(" ");
    let task = if task.trim().is_empty() {
        "Write a Python function `calculate_factorial` with a docstring that handles 0 and \
         raises ValueError for negative input."
            .to_string()
    } else {
        task
    };

    let model_name =
        env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| "claude-sonnet-4-5".to_string());
    let model = AnthropicModel::from_env(model_name)?;

    let mut reflection = ReflectionLoop::builder()
        .generator(
            ModelGenerator::new(model.clone())
                .with_system_prompt("You are a careful Python developer. Respond with code only."),
        )
        .critic(SentinelCritic::new(model))
        .max_iterations(3)
        .build()?;

    let outcome = reflection.run(task).await?;

    println!("status: {:?} after {} iteration(s)", outcome.status, outcome.iterations);
    println!("\n{}", outcome.artifact);

    Ok(())
}
