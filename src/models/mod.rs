pub mod form;
pub mod input_file;
pub mod request;
pub mod settings;
