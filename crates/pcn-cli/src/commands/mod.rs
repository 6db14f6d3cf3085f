pub mod init;
pub mod route;
pub mod run;
