pub mod client;
pub mod error;
pub mod remote_env;
pub mod types;

pub use client::{DEFAULT_BASE_URL, MasfdClient};
pub use error::ClientError;
pub use remote_env::RemoteMasfdEnv;
pub use types::{EnvConfig, FraudType, StepOutcome, TransactionAction};
