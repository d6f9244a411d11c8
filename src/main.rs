use bank_api_suite::application_impl::StepOutcome;
use bank_api_suite::harness::Harness;
use bank_api_suite::logger::*;
use bank_api_suite::settings::*;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let mut project_settings = parse_settings(cli.settings.as_deref())?;
    if cli.keep_data {
        project_settings.suite.clear_after_run = false;
    }
    info!(?project_settings);
    let logger_config = LogConfig {
        filter: project_settings.log.filter.clone(),
    };
    logger.reload_from_config(&logger_config)?;

    let harness = Harness::try_new(&project_settings).await?;
    let report = harness.runner.run().await;
    harness.shutdown().await;

    for step in &report.steps {
        match &step.outcome {
            StepOutcome::Passed => println!("PASS  {} ({:?})", step.name, step.elapsed),
            StepOutcome::Failed(reason) => println!("FAIL  {}: {}", step.name, reason),
            StepOutcome::Skipped(reason) => println!("SKIP  {}: {}", step.name, reason),
        }
    }
    if let Some(Err(e)) = &report.teardown {
        println!("FAIL  teardown: {e}");
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
