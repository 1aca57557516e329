pub mod channels;
pub mod engine;
pub mod policy;
pub mod timestamp;
pub mod transfer;
