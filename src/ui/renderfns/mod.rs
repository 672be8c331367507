pub mod footer;
pub mod header;
pub mod utils;

pub use footer::{draw_footer, StatusAlert};
pub use header::draw_header;
pub use utils::{centered_rect, format_end_date, truncate};
