pub mod cache;
pub mod run;
pub mod schema;
