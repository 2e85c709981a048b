mod guid;
mod seed;
mod token;
mod token_config;
mod token_flags;
mod token_info;

pub use guid::{find_guid, guid_list, Guid};
pub use seed::Seed;
pub use token::Token;
pub(crate) use token::TokenRecord;
pub use token_config::TokenConfig;
pub use token_flags::TokenFlags;
pub use token_info::{PinRange, TokenInfo};
