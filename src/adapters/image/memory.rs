use crate::{
    config::ImageConfig,
    ports::image::{Error, ImagePort},
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use uuid::Uuid;

/// In-memory image store handing out `{base_url}/{uuid}` URLs
#[derive(Clone, Debug)]
pub struct MemoryImageStore {
    config: ImageConfig,
    images: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryImageStore {
    pub fn new(config: ImageConfig) -> Self {
        Self {
            config,
            images: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn contains(&self, url: &str) -> Result<bool, Error> {
        Ok(self.images.lock()?.contains_key(url))
    }

    pub fn len(&self) -> Result<usize, Error> {
        Ok(self.images.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len()? == 0)
    }
}

impl Default for MemoryImageStore {
    fn default() -> Self {
        Self::new(ImageConfig::default())
    }
}

#[async_trait::async_trait]
impl ImagePort for MemoryImageStore {
    async fn upload(&self, image: Vec<u8>) -> Result<String, Error> {
        if image.is_empty() {
            return Err(Error::EmptyImage);
        }
        if image.len() > self.config.max_upload_bytes {
            return Err(Error::TooLarge {
                size: image.len(),
                max: self.config.max_upload_bytes,
            });
        }

        let url = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            Uuid::new_v4()
        );
        self.images.lock()?.insert(url.clone(), image);
        Ok(url)
    }

    async fn delete(&self, url: String) -> Result<(), Error> {
        self.images
            .lock()?
            .remove(&url)
            .map(|_| ())
            .ok_or(Error::ImageDoesNotExist(url))
    }
}
