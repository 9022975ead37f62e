pub mod color;
pub mod input;
pub mod row;
pub mod scenario;
