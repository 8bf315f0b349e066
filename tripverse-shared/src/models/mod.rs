pub mod events;
pub mod rows;
pub mod search;
pub mod user;
