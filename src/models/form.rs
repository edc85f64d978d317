use std::ffi::OsString;
use std::path::PathBuf;

use crate::error::RequestError;
use crate::models::input_file::InputFile;
use crate::models::request::ConversionRequest;
use crate::models::settings::{ConversionOptions, ToolSettings};

pub const DEFAULT_CUSTOM_NAME: &str = "%(title)s";

/// Live, user-editable form. Everything except the file list is persisted
/// between sessions.
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct FormState {
    #[serde(skip)]
    files: Vec<InputFile>,
    pub output_dir: String,
    pub custom_name: String,
    pub options: ConversionOptions,
    pub tool: ToolSettings,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            output_dir: String::new(),
            custom_name: DEFAULT_CUSTOM_NAME.to_string(),
            options: ConversionOptions::default(),
            tool: ToolSettings::default(),
        }
    }
}

impl FormState {
    /// Appends in the given order. Duplicates are kept.
    pub fn add_files<I>(&mut self, paths: I)
    where
        I: IntoIterator<Item = PathBuf>,
    {
        self.files.extend(paths.into_iter().map(InputFile::new));
    }

    pub fn clear_files(&mut self) {
        self.files.clear();
    }

    pub fn files(&self) -> &[InputFile] {
        &self.files
    }

    pub fn set_output_dir(&mut self, dir: impl Into<String>) {
        self.output_dir = dir.into();
    }

    /// Takes a directory from the folder picker. The field is edited as
    /// text, so a path that is not valid UTF-8 is refused instead of being
    /// stored in a mangled form.
    pub fn choose_output_dir(&mut self, dir: PathBuf) -> bool {
        match dir.into_os_string().into_string() {
            Ok(dir) => {
                self.output_dir = dir;
                true
            }
            Err(raw) => {
                log::warn!("ignoring output directory that is not valid UTF-8: {raw:?}");
                false
            }
        }
    }

    /// Freezes the current state into a request, or explains why it can't.
    pub fn snapshot(&self) -> Result<ConversionRequest, RequestError> {
        ConversionRequest::new(
            self.tool.clone(),
            self.paths(),
            self.output_dir_path(),
            self.custom_name_value(),
            self.options.clone(),
        )
    }

    /// Argument vector for the current state, program first. Pure: the same
    /// state always produces the same vector, even when no files are queued.
    pub fn build_command(&self) -> Vec<OsString> {
        ConversionRequest::unchecked(
            self.tool.clone(),
            self.paths(),
            self.output_dir_path(),
            self.custom_name_value(),
            self.options.clone(),
        )
        .build_command()
    }

    fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|file| file.path.clone()).collect()
    }

    fn output_dir_path(&self) -> Option<PathBuf> {
        (!self.output_dir.is_empty()).then(|| PathBuf::from(&self.output_dir))
    }

    fn custom_name_value(&self) -> Option<String> {
        (!self.custom_name.is_empty()).then(|| self.custom_name.clone())
    }
}
