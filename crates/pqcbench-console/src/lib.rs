pub mod console;
pub mod status;
pub mod tabs;

pub use console::Console;
pub use status::{BulkLog, StatusSurface, TableSlot};
pub use tabs::{TabController, PANELS};
