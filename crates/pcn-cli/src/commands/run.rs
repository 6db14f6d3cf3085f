//! `pcn run`: Replay a scenario and report the success ratio.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use clap::Args;
use pcn_node::{NetworkError, PaymentNetwork};
use tokio::sync::Semaphore;

use crate::logging;
use crate::scenario::{Scenario, TransferRequest};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Scenario file to replay.
    #[arg(short, long, default_value = "pcn.toml")]
    pub scenario: PathBuf,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override the number of transfers in flight at once.
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Route `from`/`to` transfers only over hops that can carry the amount.
    #[arg(long)]
    pub capacity_aware: bool,

    /// Print the final statistics as JSON.
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: &RunArgs) -> anyhow::Result<()> {
    let (mut config, scenario) = Scenario::load(&args.scenario)?;
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    if let Some(concurrency) = args.concurrency {
        anyhow::ensure!(concurrency > 0, "--concurrency must be at least 1");
        config.driver.concurrency = concurrency;
    }
    logging::init(&config.logging);

    let requests = scenario.requests()?;
    let network = Arc::new(PaymentNetwork::new(config.engine.clone(), args.capacity_aware));
    let setup = scenario.apply(&network);
    println!(
        "Registered {} user(s), opened {} channel(s), {} setup operation(s) rejected",
        setup.users, setup.channels, setup.rejected
    );
    tracing::info!(
        transfers = requests.len(),
        concurrency = config.driver.concurrency,
        "replaying transfers"
    );

    let progress = Arc::new(Progress::new(config.driver.report_every));
    if config.driver.concurrency == 1 {
        for (index, request) in requests.into_iter().enumerate() {
            let outcome = execute(&network, &request);
            progress.record(&network, index + 1, &request, outcome);
        }
    } else {
        let permits = Arc::new(Semaphore::new(config.driver.concurrency));
        let mut handles = Vec::with_capacity(requests.len());
        for (index, request) in requests.into_iter().enumerate() {
            let permit = Arc::clone(&permits).acquire_owned().await?;
            let network = Arc::clone(&network);
            let progress = Arc::clone(&progress);
            handles.push(tokio::task::spawn_blocking(move || {
                let outcome = execute(&network, &request);
                progress.record(&network, index + 1, &request, outcome);
                drop(permit);
            }));
        }
        for handle in handles {
            handle.await?;
        }
    }

    print_summary(&network, args.json)
}

fn execute(
    network: &PaymentNetwork,
    request: &TransferRequest,
) -> Result<Vec<u64>, NetworkError> {
    let amount = network.settlement_amount(request.amount())?;
    let receipt = match request {
        TransferRequest::Explicit { path, .. } => network.transfer(path, amount)?,
        TransferRequest::Routed { from, to, .. } => network.pay(*from, *to, amount)?,
    };
    Ok(receipt.path.iter().map(|user| user.as_u64()).collect())
}

/// Per-transfer output plus the running success ratio.
struct Progress {
    report_every: usize,
    completed: AtomicUsize,
}

impl Progress {
    fn new(report_every: usize) -> Self {
        Self {
            report_every,
            completed: AtomicUsize::new(0),
        }
    }

    fn record(
        &self,
        network: &PaymentNetwork,
        number: usize,
        request: &TransferRequest,
        outcome: Result<Vec<u64>, NetworkError>,
    ) {
        match outcome {
            Ok(path) => {
                let rendered: Vec<String> = path.iter().map(u64::to_string).collect();
                println!("#{number} ok   {request} via {}", rendered.join(" -> "));
            }
            Err(err) => println!("#{number} fail {request}: {err}"),
        }

        let completed = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        if completed % self.report_every == 0 {
            let stats = network.stats();
            println!(
                "After {completed} transactions, success ratio: {:.2}",
                stats.success_ratio()
            );
        }
    }
}

fn print_summary(network: &PaymentNetwork, json: bool) -> anyhow::Result<()> {
    let stats = network.stats();
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!();
        println!("Transfers attempted:     {}", stats.attempted);
        println!("  succeeded:             {}", stats.succeeded);
        println!("  insufficient capacity: {}", stats.insufficient_capacity);
        println!("  rejected:              {}", stats.rejected);
        println!("  no route:              {}", stats.unrouted);
        println!("  settlement failures:   {}", stats.settlement_failures);
        println!("Success ratio:           {:.2}", stats.success_ratio());
    }

    println!();
    println!(
        "{:<24} {:>12} {:<24} {:>12} {:>12}",
        "user", "balance", "counterparty", "balance", "capacity"
    );
    for row in network.balances()? {
        println!(
            "{:<24} {:>12} {:<24} {:>12} {:>12}",
            format!("{} ({})", row.low_name, row.low.as_u64()),
            row.balance_low.to_string(),
            format!("{} ({})", row.high_name, row.high.as_u64()),
            row.balance_high.to_string(),
            row.capacity.to_string(),
        );
    }

    let broken = network.ledger().verify_invariants()?;
    anyhow::ensure!(
        broken.is_empty(),
        "{} channel(s) violate balance conservation",
        broken.len()
    );
    Ok(())
}
