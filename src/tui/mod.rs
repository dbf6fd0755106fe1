pub mod field;
pub mod input;
pub mod mode;
pub mod view;
