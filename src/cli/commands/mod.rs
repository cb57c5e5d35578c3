pub mod init;
pub mod load;
pub mod user;
