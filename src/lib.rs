pub mod common;
pub mod output;
pub mod paths;
pub mod remote;
pub mod status;
pub mod sync;
