mod balance;
mod error;
mod expense;
mod money;
mod page;
mod payer;
mod window;

pub use balance::*;
pub use error::*;
pub use expense::*;
pub use money::*;
pub use page::*;
pub use payer::*;
pub use window::*;
