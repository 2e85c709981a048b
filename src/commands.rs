mod export_token;
mod import_token;
mod issue_token;
mod list_guids;
mod set_password;
mod set_pin;
mod show_token;
mod show_tokencode;
mod unlock_token;
mod watch_tokencode;

pub use export_token::export_token;
pub use import_token::import_token;
pub use issue_token::issue_token;
pub use list_guids::list_guids;
pub use set_password::set_password;
pub use set_pin::set_pin;
pub use show_token::show_token;
pub use show_tokencode::show_tokencode;
pub use watch_tokencode::watch_tokencode;
