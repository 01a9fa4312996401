use std::env;
use std::time::Instant;

use log::info;
use relayllm::{
    keyword_coverage, GenerationTask, Orchestrator, OrchestratorResult, ProviderKind, RoleTag,
    TaskIntent, use_logging,
};

#[tokio::main]
async fn main() -> OrchestratorResult<()> {
    use_logging();

    info!("Starting Batch Routing Example");

    let azure_key = env::var("AZURE_OPENAI_KEY")
        .expect("AZURE_OPENAI_KEY environment variable not set");
    let azure_endpoint = env::var("AZURE_OPENAI_ENDPOINT")
        .expect("AZURE_OPENAI_ENDPOINT environment variable not set");
    let github_token = env::var("GITHUB_TOKEN")
        .expect("GITHUB_TOKEN environment variable not set");

    let orchestrator = Orchestrator::builder()
        .add_profile("tutor-creative", ProviderKind::AzureOpenAi, "gpt-4o", &azure_key)
        .endpoint(format!(
            "{}/openai/deployments/{{deployment}}/chat/completions",
            azure_endpoint.trim_end_matches('/')
        ))
        .role(RoleTag::Creative)
        .cost_weight(10.0)
        .add_profile("grader-analytical", ProviderKind::AzureOpenAi, "gpt-4o-mini", &azure_key)
        .endpoint(format!(
            "{}/openai/deployments/{{deployment}}/chat/completions",
            azure_endpoint.trim_end_matches('/')
        ))
        .role(RoleTag::Analytical)
        .cost_weight(0.6)
        .add_profile("seeder-bulk", ProviderKind::GitHubModels, "gpt-4o-mini", &github_token)
        .role(RoleTag::Bulk)
        .cost_weight(0.6)
        .pool_size(3)
        .retries_per_profile(3)
        .build()?;

    let tasks = vec![
        GenerationTask::new("hook-fractions", "Write a playful lesson hook about fractions")
            .intent(TaskIntent::Creative)
            .temperature(0.9)
            .max_tokens(400),
        GenerationTask::new("grade-essay", "Score this essay outline for structure: ...")
            .intent(TaskIntent::Analytical)
            .temperature(0.2),
        GenerationTask::new("seed-quiz-1", "Generate a multiple-choice question on photosynthesis"),
        GenerationTask::new("seed-quiz-2", "Generate a multiple-choice question on the water cycle"),
        GenerationTask::new("seed-quiz-3", "Generate a multiple-choice question on food webs"),
    ];

    let start = Instant::now();
    let job = orchestrator.batch(tasks);
    let handle = job.handle();
    let report = orchestrator.submit(job).await;

    println!("Batch finished in {:?} (cancelled: {})", start.elapsed(), report.cancelled);
    for result in &report.results {
        println!(
            "  {} -> {:?} via {:?} in {} attempt(s)",
            result.task_id,
            result.status,
            result.profile_id,
            result.attempt_count()
        );
    }

    let metrics = handle.metrics();
    println!(
        "Attempts: {}, retries: {}, escalations: {}, tokens: {}+{}, cost avoided: {:.2}",
        metrics.attempts,
        metrics.retries,
        metrics.escalations,
        metrics.prompt_tokens,
        metrics.completion_tokens,
        metrics.cost_avoided
    );

    // Optional: pit the creative deployments against each other on one prompt.
    let arbiter = orchestrator.arbiter();
    let duel_task = GenerationTask::new("duel", "Explain negative numbers with a story")
        .intent(TaskIntent::Creative);
    let candidates = vec![
        orchestrator.registry().get("tutor-creative").expect("profile registered"),
        orchestrator.registry().get("seeder-bulk").expect("profile registered"),
    ];
    let comparison = arbiter
        .compare(&duel_task, &candidates, "keyword_coverage", &keyword_coverage)
        .await;
    println!("Quality winner: {:?}", comparison.winner_profile_id);

    Ok(())
}
