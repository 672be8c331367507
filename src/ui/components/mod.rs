mod command_input;
mod confirm;
mod input;
mod key_result;
mod record_form;
mod search_input;

pub use command_input::{CommandEvent, CommandInput};
pub use confirm::{ConfirmDialog, ConfirmEvent};
pub use key_result::KeyResult;
pub use record_form::{FormEvent, RecordForm};
pub use search_input::{SearchEvent, SearchInput};
