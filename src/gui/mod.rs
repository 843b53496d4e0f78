//! Terminal screens for the `monitor` binary.

mod destination_selector;
mod error;
mod fold_until_stop;
mod raw_terminal;

pub use destination_selector::destination_selector;
pub use error::GuiError;
pub use fold_until_stop::fold_until_stop;
