use sass_imports::{HandleRegistry, ResolverSession};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// A temporary project with `scss/file.scss` importing `a`
pub struct ScssProject {
    dir: TempDir,
}

impl ScssProject {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp project");
        fs::create_dir_all(dir.path().join("scss")).expect("create scss dir");
        fs::write(dir.path().join("scss").join("file.scss"), "@import 'a';\n")
            .expect("write root stylesheet");
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self) -> PathBuf {
        self.scss("file.scss")
    }

    pub fn scss(&self, name: &str) -> PathBuf {
        self.dir.path().join("scss").join(name)
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.scss(name);
        fs::write(&path, contents).expect("write fixture");
        path
    }
}

pub fn shared_registry() -> Arc<HandleRegistry> {
    Arc::new(HandleRegistry::new())
}

pub fn display(path: &Path) -> String {
    path.display().to_string()
}

/// Close the session if a test left it open; keeps registries clean between assertions
pub fn close_quietly(session: &ResolverSession) {
    if !session.is_closed() {
        let _ = session.close();
    }
}
