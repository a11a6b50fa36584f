//! Contract interaction and state reconciliation for the pack contract.
//!
//! - [`WalletSession`] connects the injected wallet and checks its network.
//! - [`ContractHandle`] binds address + ABI to typed `call`/`send`.
//! - [`ActionClient`] runs stake, unstake, pack purchase and NFT mint.
//! - [`Synchronizer`] rebuilds the [`UserSnapshot`] from contract reads.
//!
//! Chain access goes through the traits in `client-blockchain-core`, so the
//! same code drives TronGrid + TronLink in a browser and the mock chain in
//! tests.
pub mod actions;
pub mod amount;
pub mod config;
pub mod confirmation;
pub mod contract;
pub mod error;
pub mod pending;
pub mod platform;
pub mod session;
pub mod snapshot;
pub mod sync;

pub use actions::{ActionClient, ActionClientBuilder, ActionReceipt};
pub use amount::{SUN_PER_TRX, TrxAmount};
pub use config::{AppConfig, BUNDLED_ABI};
pub use confirmation::{Confirmation, ConfirmationStrategy};
pub use contract::{ContractHandle, ContractInterface, NftDetails, PackDetails, StakeInfo};
pub use error::{ClientError, Result};
pub use pending::{ActionKind, ActionObserver, ActionParams, ActionStatus, PendingAction};
pub use session::{Session, WalletSession};
pub use snapshot::{NftRef, PackRef, UserSnapshot};
pub use sync::Synchronizer;
