pub mod health;
pub mod print;
