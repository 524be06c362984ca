pub mod bed;
pub mod time;
