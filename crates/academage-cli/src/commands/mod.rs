pub mod age;
pub mod assess;
pub mod batch;
pub mod compare;
pub mod convert;
pub mod init;
pub mod standardize;
pub mod validate;
