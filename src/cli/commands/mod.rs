pub mod password;
pub mod seed;
pub mod token;
