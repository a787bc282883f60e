pub mod embed;
pub mod init_db;
pub mod providers;
