//! Walks the MASFD service through one create/observe/step/reset cycle.
//! Expects the service to be listening on the default address.

use anyhow::Result;
use masfd_client::{EnvConfig, MasfdClient, TransactionAction};
use std::collections::HashMap;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let client = MasfdClient::new();
    let config = EnvConfig::default();
    let ack = client.create_env(&config)?;
    println!("created environment ({config:?}): {ack}");

    let state = client.get_state()?;
    println!("initial state has {} features: {state:?}", state.len());

    let mut actions = HashMap::new();
    actions.insert(
        1,
        TransactionAction {
            transaction_id: 1,
            flag: true,
        },
    );
    actions.insert(
        2,
        TransactionAction {
            transaction_id: 2,
            flag: false,
        },
    );
    let outcome = client.step(&actions)?;
    println!(
        "step rewards {:?}, done: {}, next state has {} features",
        outcome.rewards,
        outcome.done,
        outcome.state.len()
    );

    let ack = client.reset()?;
    println!("reset: {ack}");
    Ok(())
}
