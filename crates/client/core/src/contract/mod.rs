//! Contract proxy: binds an address and ABI to typed `call` and `send`.
mod handle;
mod interface;
mod methods;

pub use handle::{ContractHandle, DEFAULT_FEE_LIMIT};
pub use interface::{ContractInterface, MethodSpec, REQUIRED_METHODS, StateMutability};
pub use methods::{NftDetails, PackDetails, StakeInfo};
