pub mod file_list;
pub mod log_view;
pub mod options;
