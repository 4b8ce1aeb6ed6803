pub mod envelope;
pub mod request;
