use common::time::ElapsedTimer;
use harness::{builtin_scenarios, sample_responses, BenchRunner, ReplayTarget, Target};
use hdrhistogram::Histogram;
use std::sync::Arc;
use std::time::{Duration, Instant};

const TIMER_ITERATIONS: usize = 1_000_000;
const DISPATCH_ITERATIONS: usize = 100_000;
const BURST_SIZE: usize = 10;

fn bench_timer_reads() -> Histogram<u64> {
    let mut hist = Histogram::<u64>::new_with_bounds(1, 1_000_000, 3).unwrap();
    let mut timer = ElapsedTimer::new();
    timer.measure();

    println!(
        "Running Timer Read Benchmark ({} iterations)...",
        TIMER_ITERATIONS
    );

    for _ in 0..TIMER_ITERATIONS {
        let start = Instant::now();
        let _ = timer.measure();
        hist.saturating_record(start.elapsed().as_nanos() as u64);
    }
    hist
}

async fn bench_dispatch() -> anyhow::Result<Histogram<u64>> {
    let mut hist = Histogram::<u64>::new_with_bounds(1, 100_000_000, 3).unwrap();
    let scenarios = builtin_scenarios();
    let target = Target::Replay(ReplayTarget::from_lines(
        "probe",
        sample_responses(&scenarios),
        Duration::ZERO,
    )?);

    println!(
        "Running Replay Dispatch Benchmark ({} iterations)...",
        DISPATCH_ITERATIONS
    );

    let prompt = &scenarios[0].prompt;
    for _ in 0..DISPATCH_ITERATIONS {
        let start = Instant::now();
        target.invoke(prompt).await?;
        hist.saturating_record(start.elapsed().as_nanos() as u64);
    }
    Ok(hist)
}

fn print_stats(name: &str, hist: &Histogram<u64>) {
    println!("\n--- {} Results (ns) ---", name);
    println!("Min:    {}", hist.min());
    println!("p50:    {}", hist.value_at_quantile(0.50));
    println!("p95:    {}", hist.value_at_quantile(0.95));
    println!("p99:    {}", hist.value_at_quantile(0.99));
    println!("Max:    {}", hist.max());
    println!("Mean:   {:.2}", hist.mean());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let timer_hist = bench_timer_reads();
    print_stats("Timer Read", &timer_hist);

    let dispatch_hist = bench_dispatch().await?;
    print_stats("Replay Dispatch", &dispatch_hist);

    println!("\nRunning Concurrent Burst ({} requests)...", BURST_SIZE);
    let scenarios = builtin_scenarios();
    let target = Arc::new(Target::Replay(ReplayTarget::from_lines(
        "burst",
        sample_responses(&scenarios),
        Duration::from_millis(5),
    )?));
    let results = BenchRunner::run_concurrent(target, &scenarios[0].prompt, BURST_SIZE).await;
    let completed = results.iter().filter(|r| r.is_ok()).count();
    println!("Completed: {}/{}", completed, BURST_SIZE);

    assert_eq!(completed, BURST_SIZE, "Concurrent burst dropped requests!");
    println!("\nSUCCESS: probe complete.");

    Ok(())
}
