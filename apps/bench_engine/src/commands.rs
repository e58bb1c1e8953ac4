use crate::config::{AppConfig, RunConfig, TargetConfig, TargetKind};
use anyhow::{bail, Context};
use common::Scenario;
use harness::{
    builtin_scenarios, sample_responses, BenchRunner, HttpTarget, ReplayTarget, RunOptions, Target,
};
use selector::TaskComplexity;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn build_target(cfg: &TargetConfig, run: &RunConfig) -> anyhow::Result<Target> {
    match cfg.kind {
        TargetKind::Replay => {
            let latency = Duration::from_millis(cfg.latency_ms.unwrap_or(0));
            let target = match &cfg.fixture {
                Some(path) => ReplayTarget::from_file(&cfg.name, path, latency),
                None => ReplayTarget::from_lines(
                    &cfg.name,
                    sample_responses(&builtin_scenarios()),
                    latency,
                ),
            }
            .with_context(|| format!("Failed to build replay target '{}'", cfg.name))?;
            Ok(Target::Replay(target))
        }
        TargetKind::Http => {
            let url = cfg
                .url
                .clone()
                .with_context(|| format!("Target '{}' is missing url", cfg.name))?;
            let model = cfg.model.clone().unwrap_or_else(|| cfg.name.clone());
            let api_key = match &cfg.api_key_env {
                Some(var) => Some(
                    std::env::var(var)
                        .with_context(|| format!("Environment variable {} is not set", var))?,
                ),
                None => None,
            };

            Ok(Target::Http(HttpTarget::new(
                &cfg.name,
                url,
                model,
                api_key,
                run.max_tokens,
                Duration::from_secs(run.request_timeout_secs),
                cfg.rate_limit_per_sec,
            )))
        }
    }
}

/// Benchmark every configured target across the builtin scenarios, persist
/// the results, and evaluate thresholds.
pub async fn run_suite(config: &AppConfig, strict: bool) -> anyhow::Result<()> {
    if config.targets.is_empty() {
        bail!("No targets configured");
    }

    let scenarios = builtin_scenarios();
    let runner = BenchRunner::new(RunOptions {
        iterations_per_scenario: config.run.iterations_per_scenario,
        warmup_iterations: config.run.warmup_iterations,
    });

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_flag = shutdown.clone();
    ctrlc::set_handler(move || {
        tracing::warn!("Ctrl+C received - finishing the current query then stopping");
        shutdown_flag.store(true, Ordering::SeqCst);
    })
    .context("Error setting Ctrl-C handler")?;

    let mut all_metrics = Vec::new();
    for target_cfg in &config.targets {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        let target = build_target(target_cfg, &config.run)?;
        tracing::info!("Benchmarking {}...", target.name());
        let metrics = runner.run_target(&target, &scenarios, &shutdown).await;
        all_metrics.push(metrics);
    }

    let run_report = report::RunReport::new(all_metrics.clone());
    let report_path = report::write_report(&config.engine.report_dir, &run_report)?;
    report::append_history(&config.engine.history_file, &all_metrics)?;

    println!("{}", report::render_summary(&all_metrics));
    println!("Report: {}", report_path.display());

    let violations: Vec<String> = all_metrics
        .iter()
        .filter_map(|metrics| config.thresholds.check(metrics).err())
        .map(|e| e.to_string())
        .collect();

    for violation in &violations {
        tracing::warn!("{}", violation);
    }

    if strict && !violations.is_empty() {
        bail!(
            "{} threshold violation(s): {}",
            violations.len(),
            violations.join("; ")
        );
    }

    Ok(())
}

/// Run one ad-hoc task on two targets and print them side by side with a
/// recommendation from the selector.
pub async fn compare(
    config: &AppConfig,
    first: &str,
    second: &str,
    task: &str,
    complexity: TaskComplexity,
) -> anyhow::Result<()> {
    let scenarios = vec![Scenario::ad_hoc(task)];
    let runner = BenchRunner::new(RunOptions::default());
    let shutdown = AtomicBool::new(false);

    let mut fresh = Vec::new();
    for name in [first, second] {
        let target_cfg = config
            .targets
            .iter()
            .find(|t| t.name == name)
            .with_context(|| format!("Target '{}' is not configured", name))?;
        let target = build_target(target_cfg, &config.run)?;

        tracing::info!("Comparing {} on task: {}", name, task);
        fresh.push(runner.run_target(&target, &scenarios, &shutdown).await);
    }

    println!("{}", report::render_summary(&fresh));

    let mut history = report::load_history(&config.engine.history_file)?;
    history.extend(fresh);
    match selector::select_optimal(&history, complexity) {
        Some(name) => println!("Recommended target: {}", name),
        None => println!("No metrics available - no recommendation"),
    }

    Ok(())
}

/// List the configured targets.
pub fn list_targets(config: &AppConfig) {
    println!("Configured targets:");
    for t in &config.targets {
        match t.kind {
            TargetKind::Replay => {
                let fixture = t.fixture.as_deref().unwrap_or("<synthesized>");
                println!("  {:<20} replay  fixture={}", t.name, fixture);
            }
            TargetKind::Http => {
                let model = t.model.as_deref().unwrap_or(&t.name);
                println!("  {:<20} http    model={}", t.name, model);
            }
        }
    }
}

/// Show per-target credential and configuration status.
pub fn status(config: &AppConfig) {
    println!("Targets configured: {}", config.targets.len());
    for t in &config.targets {
        match t.kind {
            TargetKind::Replay => {
                println!("  {:<20} OK       replay target, no credentials needed", t.name);
            }
            TargetKind::Http => {
                if t.url.is_none() {
                    println!("  {:<20} MISSING  no url configured", t.name);
                    continue;
                }
                match &t.api_key_env {
                    Some(var) if std::env::var(var).is_ok() => {
                        println!("  {:<20} OK       {} is set", t.name, var);
                    }
                    Some(var) => {
                        println!("  {:<20} MISSING  {} is not set", t.name, var);
                    }
                    None => {
                        println!("  {:<20} OK       unauthenticated endpoint", t.name);
                    }
                }
            }
        }
    }
    println!("Report dir:  {}", config.engine.report_dir);
    println!("History:     {}", config.engine.history_file);
}
