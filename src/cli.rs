use std::path::PathBuf;

use clap::Parser;

use crate::models::form::FormState;

#[derive(Debug, Parser, Clone, Default)]
#[command(
    name = "m4b-gui",
    version,
    about = "Desktop front-end for the m4b audiobook converter"
)]
pub struct Cli {
    /// Converter executable; replaces the saved one
    #[arg(long, value_name = "PROGRAM")]
    pub tool: Option<String>,

    /// Argument placed before the converter flags (repeatable), e.g. the
    /// script path when the tool is an interpreter
    #[arg(long = "tool-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub tool_args: Vec<String>,

    /// Output directory to preselect
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<String>,

    /// Input files to queue on startup
    pub files: Vec<PathBuf>,
}

impl Cli {
    /// Layers command-line values over the saved form.
    pub fn apply(self, form: &mut FormState) {
        if let Some(program) = self.tool {
            form.tool.program = program;
            form.tool.leading_args = self.tool_args;
        } else if !self.tool_args.is_empty() {
            form.tool.leading_args = self.tool_args;
        }

        if let Some(dir) = self.output_dir {
            form.set_output_dir(dir);
        }

        form.add_files(self.files);
    }
}
