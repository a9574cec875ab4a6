pub mod entity;
pub mod init;
pub mod members;
