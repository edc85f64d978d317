use std::ffi::OsString;

/// Boolean switches forwarded to the converter as bare flags.
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ConversionOptions {
    /// Write metadata with ffmpeg instead of mp4v2.
    pub no_mp4v2: bool,
    pub skip_encoding: bool,
    pub debug: bool,
    pub pipe_wav: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            no_mp4v2: true,
            skip_encoding: false,
            debug: false,
            pipe_wav: false,
        }
    }
}

impl ConversionOptions {
    /// Enabled flags, always in the same relative order.
    pub fn flags(&self) -> impl Iterator<Item = &'static str> + '_ {
        [
            (self.no_mp4v2, "--no-mp4v2"),
            (self.skip_encoding, "--skip-encoding"),
            (self.debug, "--debug"),
            (self.pipe_wav, "--pipe-wav"),
        ]
        .into_iter()
        .filter_map(|(enabled, flag)| enabled.then_some(flag))
    }
}

/// How the converter is launched: an executable plus any arguments that
/// precede the converter's own flags (e.g. an interpreter and its script).
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ToolSettings {
    pub program: String,
    pub leading_args: Vec<String>,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            program: "python3".to_string(),
            leading_args: vec!["m4b.py".to_string()],
        }
    }
}

impl ToolSettings {
    pub fn argv_prefix(&self) -> Vec<OsString> {
        std::iter::once(&self.program)
            .chain(&self.leading_args)
            .map(OsString::from)
            .collect()
    }
}
