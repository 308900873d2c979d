pub mod cloud189;
pub mod local;
