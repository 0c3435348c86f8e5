pub mod sniff;
pub mod text;
pub mod utils;

pub use sniff::*;
pub use text::*;
pub use utils::*;
