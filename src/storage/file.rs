// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{error::Result, metadata};

use super::Storage;

/// A JSON document under the project data directory. The file holds a bearer
/// credential, so on Unix it is created readable by the owner only.
pub(crate) struct File {
    path: PathBuf,
}

impl File {
    pub(crate) fn new<P: AsRef<Path>>(file: P) -> Option<Self> {
        metadata::PROJECT_DIRS
            .as_ref()
            .map(|dirs| Self::at(dirs.data_dir().join(file)))
    }

    pub(crate) fn at<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    fn create(&self) -> io::Result<fs::File> {
        let mut options = fs::OpenOptions::new();
        let _ = options.write(true).create(true).truncate(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt as _;
            let _ = options.mode(0o600);
        }

        options.open(&self.path)
    }
}

#[async_trait]
impl<T: Send + Serialize + Sync + for<'de> Deserialize<'de>> Storage<T> for File {
    fn is_persistent(&self) -> bool {
        true
    }

    async fn load(&mut self) -> Result<Option<T>> {
        match fs::File::open(&self.path) {
            Ok(fp) => Ok(Some(serde_json::from_reader::<fs::File, T>(fp)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&mut self, value: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        debug!("Writing session to {}", self.path.display());
        serde_json::to_writer(self.create()?, value)?;
        Ok(())
    }

    async fn clear(&mut self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => Ok(other?),
        }
    }
}
