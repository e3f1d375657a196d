use std::fs;

use tempfile::TempDir;

// Writes a source tree under a fresh temp directory; file paths are relative
// to the returned root, with `/` separators as they appear in reports.
pub fn source_tree(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("create fixture root");
    for (name, contents) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create fixture directories");
        }
        fs::write(&path, contents).expect("write fixture file");
    }
    dir
}
