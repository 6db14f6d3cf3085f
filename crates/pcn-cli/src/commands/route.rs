//! `pcn route`: Print the shortest path between two users.

use clap::Args;
use pcn_core::{Amount, UserId};
use pcn_node::PaymentNetwork;
use std::path::PathBuf;

use crate::logging;
use crate::scenario::Scenario;

#[derive(Args, Debug)]
pub struct RouteArgs {
    /// Scenario file providing users and channels.
    #[arg(short, long, default_value = "pcn.toml")]
    pub scenario: PathBuf,

    /// Paying user.
    #[arg(long)]
    pub from: u64,

    /// Receiving user.
    #[arg(long)]
    pub to: u64,

    /// Only use hops that can currently carry this amount.
    #[arg(long)]
    pub amount: Option<u64>,
}

pub fn run(args: &RouteArgs) -> anyhow::Result<()> {
    let (config, scenario) = Scenario::load(&args.scenario)?;
    logging::init(&config.logging);

    let network = PaymentNetwork::new(config.engine.clone(), args.amount.is_some());
    scenario.apply(&network);

    let amount = Amount::from(args.amount.unwrap_or(0));
    let path = network.route(UserId(args.from), UserId(args.to), amount)?;

    let rendered: Vec<String> = path.iter().map(|user| user.as_u64().to_string()).collect();
    println!("{}", rendered.join(" -> "));
    println!("{} hop(s)", path.len() - 1);
    Ok(())
}
