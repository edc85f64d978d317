use std::ffi::OsString;
use std::path::PathBuf;

use crate::error::RequestError;
use crate::models::settings::{ConversionOptions, ToolSettings};

/// Everything needed for one converter run, frozen when "start" is pressed.
/// Later edits to the form do not reach a run already in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    tool: ToolSettings,
    files: Vec<PathBuf>,
    output_dir: Option<PathBuf>,
    custom_name: Option<String>,
    options: ConversionOptions,
}

impl ConversionRequest {
    pub fn new(
        tool: ToolSettings,
        files: Vec<PathBuf>,
        output_dir: Option<PathBuf>,
        custom_name: Option<String>,
        options: ConversionOptions,
    ) -> Result<Self, RequestError> {
        if files.is_empty() {
            return Err(RequestError::NoInputFiles);
        }

        Ok(Self::unchecked(tool, files, output_dir, custom_name, options))
    }

    /// Same as [`ConversionRequest::new`] without the non-empty check; only
    /// used to preview the command line of an incomplete form.
    pub(crate) fn unchecked(
        tool: ToolSettings,
        files: Vec<PathBuf>,
        output_dir: Option<PathBuf>,
        custom_name: Option<String>,
        options: ConversionOptions,
    ) -> Self {
        Self {
            tool,
            files,
            output_dir,
            custom_name,
            options,
        }
    }

    /// Full argument vector, program first:
    /// `<tool> --assume-yes [--output-dir DIR] [--custom-name NAME] [flags] FILE...`
    pub fn build_command(&self) -> Vec<OsString> {
        let mut cmd = self.tool.argv_prefix();
        cmd.push("--assume-yes".into());

        if let Some(dir) = &self.output_dir {
            cmd.push("--output-dir".into());
            cmd.push(dir.into());
        }

        if let Some(name) = &self.custom_name {
            cmd.push("--custom-name".into());
            cmd.push(name.into());
        }

        cmd.extend(self.options.flags().map(OsString::from));
        cmd.extend(self.files.iter().map(OsString::from));
        cmd
    }

    /// Lossy, space-joined rendering for the log.
    pub fn display_command(&self) -> String {
        self.build_command()
            .iter()
            .map(|arg| arg.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
