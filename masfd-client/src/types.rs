use serde::{Deserialize, Serialize};
use std::fmt;

/// Fraud pattern the service should plant into the transaction stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FraudType {
    CreditCard,
    AccountTakeover,
    Synthetic,
}

impl fmt::Display for FraudType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CreditCard => "credit_card",
            Self::AccountTakeover => "account_takeover",
            Self::Synthetic => "synthetic",
        };
        f.write_str(name)
    }
}

/// Configuration for `POST /createMASFDEnv`. The wire format uses camelCase
/// keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvConfig {
    pub num_agents: usize,
    pub num_transactions: usize,
    pub fraud_ratio: f64,
    pub fraud_type: FraudType,
}

impl EnvConfig {
    pub fn new(
        num_agents: usize,
        num_transactions: usize,
        fraud_ratio: f64,
        fraud_type: FraudType,
    ) -> Self {
        Self {
            num_agents,
            num_transactions,
            fraud_ratio,
            fraud_type,
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new(5, 100, 0.05, FraudType::CreditCard)
    }
}

/// One flag/clear decision for a transaction. The step payload is a JSON
/// object keyed by transaction id with these as the values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionAction {
    pub transaction_id: u64,
    pub flag: bool,
}

/// The `(state, rewards, done)` tuple `POST /step` answers with. All fields
/// default so a partial body decodes instead of failing the step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StepOutcome {
    pub state: Vec<f32>,
    pub rewards: Vec<f32>,
    pub done: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn env_config_uses_camel_case_keys() {
        let config = EnvConfig::default();
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(
            value,
            json!({
                "numAgents": 5,
                "numTransactions": 100,
                "fraudRatio": 0.05,
                "fraudType": "credit_card",
            })
        );
    }

    #[test]
    fn step_payload_keys_are_stringified_ids() {
        let mut actions = std::collections::HashMap::new();
        actions.insert(
            1u64,
            TransactionAction {
                transaction_id: 1,
                flag: true,
            },
        );
        let value = serde_json::to_value(&actions).unwrap();
        assert_eq!(value, json!({"1": {"transactionId": 1, "flag": true}}));
    }

    #[test]
    fn step_outcome_tolerates_missing_fields() {
        let outcome: StepOutcome = serde_json::from_str("{}").unwrap();
        assert!(outcome.state.is_empty());
        assert!(outcome.rewards.is_empty());
        assert!(!outcome.done);

        let outcome: StepOutcome =
            serde_json::from_str(r#"{"state": [0.5], "rewards": [1.0, -1.0], "done": true}"#)
                .unwrap();
        assert_eq!(outcome.state, vec![0.5]);
        assert_eq!(outcome.rewards, vec![1.0, -1.0]);
        assert!(outcome.done);
    }

    #[test]
    fn fraud_type_display_matches_wire_format() {
        assert_eq!(FraudType::CreditCard.to_string(), "credit_card");
        assert_eq!(
            serde_json::to_value(FraudType::AccountTakeover).unwrap(),
            json!("account_takeover")
        );
    }
}
