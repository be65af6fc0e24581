mod observer;
mod session_rng;

pub mod snake;

pub use observer::MatchObserver;
pub use session_rng::SessionRng;
