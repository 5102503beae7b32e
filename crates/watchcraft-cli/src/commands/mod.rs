pub mod add;
pub mod config;
pub mod context;
pub mod edit;
pub mod list;
pub mod recommend;
pub mod render;
pub mod search;
