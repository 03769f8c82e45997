pub mod batch;
pub mod common;
pub mod decode;
pub mod delegation;
pub mod mask;
pub mod sid;
