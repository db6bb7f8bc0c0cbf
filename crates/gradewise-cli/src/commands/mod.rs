pub mod ask;
pub mod grade;
pub mod init;
pub mod quiz;
pub mod suggest;
pub mod transcribe;
pub mod validate;
