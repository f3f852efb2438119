pub mod errordialog;
pub mod infodialog;
