//! Trains a REINFORCE agent against the scripted fraud stream and reports
//! the average episode reward of the trained policy. No service required.

use anyhow::Result;
use masfd_api::builders::reinforce::ReinforceBuilder;
use masfd_api::test_utils::{ScriptedFraudEnv, run_episodes};
use masfd_core::agents::Agent;
use masfd_core::env::RolloutMode;
use masfd_core::{Algorithm, on_policy_algorithm::LearningSchedule};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let envs: Vec<_> = (0..4).map(|_| ScriptedFraudEnv::new(100, 0.1, 5)).collect();
    let mut builder = ReinforceBuilder::default();
    builder.set_learning_schedule(LearningSchedule::total_step_bound(20_000));
    builder.set_rollout_mode(RolloutMode::StepBound { n_steps: 256 });
    let mut algo = builder.build(envs)?;
    algo.train()?;

    let mut env = ScriptedFraudEnv::new(100, 0.1, 5);
    let avg_reward = run_episodes(&mut env, 10, algo.agent.distribution())?;
    println!("average episode reward over 10 evaluation episodes: {avg_reward:.2}");
    Ok(())
}
