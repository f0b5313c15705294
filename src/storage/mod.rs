// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

//! Backends for the signed-in session: a file under the data directory, or
//! process memory when nothing should be written to disk.

mod file;
mod memory;

use async_trait::async_trait;

use crate::error::Result;

pub(crate) use file::File;
pub(crate) use memory::Memory;

/// A slot holding at most one value.
#[async_trait]
pub(crate) trait Storage<T>: Send + Sync {
    /// Whether a saved value is still there for the next process.
    fn is_persistent(&self) -> bool;

    async fn load(&mut self) -> Result<Option<T>>;
    async fn save(&mut self, value: &T) -> Result<()>;

    /// Empties the slot. Emptying an empty slot succeeds.
    async fn clear(&mut self) -> Result<()>;
}

#[async_trait]
impl<T: Sync, S: Storage<T> + ?Sized> Storage<T> for Box<S> {
    fn is_persistent(&self) -> bool {
        (**self).is_persistent()
    }

    async fn load(&mut self) -> Result<Option<T>> {
        (**self).load().await
    }

    async fn save(&mut self, value: &T) -> Result<()> {
        (**self).save(value).await
    }

    async fn clear(&mut self) -> Result<()> {
        (**self).clear().await
    }
}
