pub mod compiler;
pub mod deferred;
pub mod handlers;
pub mod interpreter;
pub mod trace;
