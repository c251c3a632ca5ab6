pub mod backup;
pub mod restore;
pub mod start;
pub mod stop;
