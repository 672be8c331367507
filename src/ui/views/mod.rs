mod blocklist;
mod login_error;

pub use blocklist::BlocklistView;
pub use login_error::LoginErrorView;
