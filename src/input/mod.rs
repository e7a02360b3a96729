mod handler;

pub use handler::{Request, handle_event};
