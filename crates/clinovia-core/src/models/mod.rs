pub mod audit;
pub mod identity;
pub mod input;
pub mod output;
pub mod result;
