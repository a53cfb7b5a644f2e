use {anyhow::anyhow, std::path::PathBuf};

/// The subgraph tool keeps its config, and optionally custom schemas and
/// fixtures, in one directory.
pub struct HomeDirectory {
    home: PathBuf,
}

impl HomeDirectory {
    pub fn new(home: PathBuf) -> Self {
        Self { home }
    }

    /// Use the given directory, or `~/.roboshare-subgraph` if none is given.
    pub fn new_or_default(home: Option<PathBuf>) -> anyhow::Result<Self> {
        if let Some(home) = home {
            return Ok(Self::new(home));
        }

        let user_home =
            home::home_dir().ok_or_else(|| anyhow!("failed to find the user's home directory"))?;

        Ok(Self::new(user_home.join(".roboshare-subgraph")))
    }

    pub fn config_file(&self) -> PathBuf {
        self.home.join("app.toml")
    }
}
