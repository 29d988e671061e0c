pub mod fixtures {
    use crate::InventoryContext;
    use crate::cli::ScanArgs;
    use crate::config::Config;
    use anyhow::Result;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// A scratch file tree plus a catalog path outside of it.
    pub struct TestTree {
        pub temp_dir: TempDir,
        pub source: String,
        pub context: InventoryContext,
    }

    impl TestTree {
        pub fn new(source: &str) -> Result<Self> {
            let temp_dir = tempfile::tempdir()?;
            fs::create_dir_all(temp_dir.path().join("files"))?;
            let context =
                InventoryContext::new_explicit(temp_dir.path().join("db/index.db"), Config::default());
            Ok(Self {
                temp_dir,
                source: source.to_string(),
                context,
            })
        }

        /// Directory that gets scanned.
        pub fn root(&self) -> PathBuf {
            self.temp_dir.path().join("files")
        }

        pub fn scan_args(&self) -> ScanArgs {
            ScanArgs {
                path: Some(self.root()),
                source: Some(self.source.clone()),
            }
        }

        pub fn create_file(&self, name: &str, content: &str) -> Result<PathBuf> {
            let path = self.root().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, content)?;
            Ok(path)
        }
    }
}
