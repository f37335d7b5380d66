/// Binary storage for recipe pictures
#[mockall::automock]
#[async_trait::async_trait]
pub trait ImagePort {
    /// Store an image, returning the URL it is served from
    async fn upload(&self, image: Vec<u8>) -> Result<String, Error>;
    async fn delete(&self, url: String) -> Result<(), Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("image is empty")]
    EmptyImage,

    #[error("image is too large: {size} bytes, at most {max} allowed")]
    TooLarge { size: usize, max: usize },

    #[error("image {0} does not exist")]
    ImageDoesNotExist(String),

    /// Concrete adapter errors
    ///
    /// This could represent any errors from a concrete adapter, such as an object storage
    /// being unreachable.
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
