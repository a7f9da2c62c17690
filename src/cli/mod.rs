pub mod config_cmd;
pub mod generate;
pub mod list;
pub mod projects;
pub mod serve;
