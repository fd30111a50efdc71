use anyhow::Result;
use masfd_api::builders::reinforce::ReinforceBuilder;
use masfd_api::test_utils::{ScriptedFraudEnv, run_episodes};
use masfd_core::agents::Agent;
use masfd_core::env::RolloutMode;
use masfd_core::{Algorithm, on_policy_algorithm::LearningSchedule};

const NUM_ENVIRONMENTS: usize = 2;

fn scripted_envs() -> Vec<ScriptedFraudEnv> {
    (0..NUM_ENVIRONMENTS)
        .map(|_| ScriptedFraudEnv::new(40, 0.2, 4))
        .collect()
}

#[test]
fn reinforce_scripted_fraud() -> Result<()> {
    let mut builder = ReinforceBuilder::default();
    builder.set_learning_schedule(LearningSchedule::total_step_bound(2048));
    builder.set_rollout_mode(RolloutMode::StepBound { n_steps: 128 });
    let mut algo = builder.build(scripted_envs())?;
    algo.train()?;
    Ok(())
}

#[test]
fn reinforce_episode_bound_rollouts() -> Result<()> {
    let mut builder = ReinforceBuilder::default();
    builder.set_learning_schedule(LearningSchedule::rollout_bound(4));
    builder.set_rollout_mode(RolloutMode::EpisodeBound { n_episodes: 2 });
    builder.set_sample_size(32);
    let mut algo = builder.build(scripted_envs())?;
    algo.train()?;
    Ok(())
}

#[test]
fn trained_policy_plays_full_episodes() -> Result<()> {
    let mut builder = ReinforceBuilder::default();
    builder.set_learning_schedule(LearningSchedule::total_step_bound(1024));
    builder.set_rollout_mode(RolloutMode::StepBound { n_steps: 128 });
    let mut algo = builder.build(scripted_envs())?;
    algo.train()?;

    let mut env = ScriptedFraudEnv::new(40, 0.2, 4);
    let avg_reward = run_episodes(&mut env, 5, algo.agent.distribution())?;
    // Ten decisions per episode bound the reward to [-10, 10].
    assert!((-10. ..=10.).contains(&avg_reward));
    Ok(())
}
