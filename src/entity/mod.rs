//! SeaORM entity definitions for PostgreSQL database.

pub mod api_key;
pub mod project;
pub mod system_config;
pub mod test_case;
pub mod test_output_file;
pub mod test_run;
pub mod user;
