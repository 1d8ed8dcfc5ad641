mod callback;
mod command;
mod game;
mod message;
mod writing;

pub use callback::*;
pub use command::*;
pub use game::*;
pub use message::*;
pub use writing::*;
