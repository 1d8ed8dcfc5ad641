mod cancel;
mod difficulty;
mod evaluator;
mod plan;
mod scheduler;
mod session;
mod timer;

pub use cancel::*;
pub use difficulty::*;
pub use evaluator::*;
pub use plan::*;
pub use scheduler::*;
pub use session::*;
pub use timer::*;
