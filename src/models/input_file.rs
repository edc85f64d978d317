use std::path::PathBuf;

/// A file queued for conversion. Existence and format are not checked here;
/// the converter reports on those itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputFile {
    pub path: PathBuf,
    pub filename: String,
}

impl InputFile {
    pub fn new(path: PathBuf) -> Self {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        Self { path, filename }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shows_base_name() {
        let file = InputFile::new(PathBuf::from("/books/part one/book1.mp3"));
        assert_eq!(file.filename, "book1.mp3");
        assert_eq!(file.path, PathBuf::from("/books/part one/book1.mp3"));
    }

    #[test]
    fn path_without_name_is_shown_whole() {
        let file = InputFile::new(PathBuf::from("/"));
        assert_eq!(file.filename, "/");
    }
}
