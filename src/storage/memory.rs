// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;

use crate::error::Result;

use super::Storage;

/// Keeps the value for the lifetime of the process only.
pub(crate) struct Memory<T> {
    data: Option<T>,
}

impl<T> Memory<T> {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) const fn with_data(data: T) -> Self {
        Self { data: Some(data) }
    }
}

#[async_trait]
impl<T: Send + Sync + Clone> Storage<T> for Memory<T> {
    fn is_persistent(&self) -> bool {
        false
    }

    async fn load(&mut self) -> Result<Option<T>> {
        Ok(self.data.clone())
    }

    async fn save(&mut self, value: &T) -> Result<()> {
        self.data = Some(value.clone());
        Ok(())
    }

    async fn clear(&mut self) -> Result<()> {
        self.data = None;
        Ok(())
    }
}

impl<T> Default for Memory<T> {
    fn default() -> Self {
        Self { data: None }
    }
}
