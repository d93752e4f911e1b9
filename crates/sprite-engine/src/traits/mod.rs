pub mod draw;
pub mod text;
pub mod time;
