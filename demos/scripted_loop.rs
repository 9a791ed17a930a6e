use std::error::Error;

use futures_util::StreamExt;
use refine_rs::{
    Critique, LoopEvent, ReflectionLoop, ScriptedCritic, ScriptedGenerator,
};

fn build_loop() -> Result<ReflectionLoop, Box<dyn Error>> {
    let generator = ScriptedGenerator::from_texts([
        "def greet():\n    return 'hi'",
        "def greet():\n    \"\"\"Return a short greeting.\"\"\"\n    return 'hi'",
    ]);

    let critic = ScriptedCritic::new(vec![
        Ok(Critique::Rejected {
            findings: vec!["missing docstring".to_string()],
        }),
        Ok(Critique::Accepted),
    ]);

    Ok(ReflectionLoop::builder()
        .generator(generator)
        .critic(critic)
        .max_iterations(3)
        .build()?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let mut reflection = build_loop()?;

    let outcome = reflection.run("produce a greeting function").await?;
    println!(
        "run final ({:?} after {} iterations):\n{}\n",
        outcome.status, outcome.iterations, outcome.artifact
    );

    let mut streaming_loop = build_loop()?;
    let stream = streaming_loop.run_stream("produce a greeting function");
    futures_util::pin_mut!(stream);

    while let Some(event) = stream.next().await {
        match event? {
            LoopEvent::IterationStart { iteration } => println!("iteration {iteration}"),
            LoopEvent::Artifact { content, .. } => println!("artifact: {content}"),
            LoopEvent::Verdict { critique, .. } => println!("verdict: {critique:?}"),
            LoopEvent::Finished { status, iterations } => {
                println!("finished: {status:?} after {iterations} iterations")
            }
        }
    }

    Ok(())
}
