use crate::common::error::SwagError;

/// Result alias used across the whole crate
///
/// # Examples
///
/// ```
/// use swag::common::result::SwagResult;
/// use swag::common::error::SwagError;
///
/// fn example_function() -> SwagResult<String> {
///     Ok("success".to_string())
/// }
///
/// fn example_with_error() -> SwagResult<()> {
///     Err(SwagError::internal_error("Something went wrong"))
/// }
/// ```
pub type SwagResult<T> = Result<T, SwagError>;

/// Conversion helpers for foreign `Result` types
pub trait ResultExt<T, E> {
    /// Wrap an I/O failure with a message and the path it happened on
    ///
    /// # Examples
    ///
    /// ```
    /// use swag::common::result::{SwagResult, ResultExt};
    ///
    /// let result: Result<String, std::io::Error> = Err(std::io::Error::new(
    ///     std::io::ErrorKind::NotFound, "file not found"
    /// ));
    /// let swag_result: SwagResult<String> = result.with_filesystem_error("Failed to read", None);
    /// assert!(swag_result.is_err());
    /// ```
    fn with_filesystem_error(
        self,
        message: impl Into<String>,
        path: Option<std::path::PathBuf>,
    ) -> SwagResult<T>
    where
        E: Into<std::io::Error>;

    /// Wrap any error as a configuration error
    fn with_config_error(self, message: impl Into<String>) -> SwagResult<T>
    where
        E: std::error::Error + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn with_filesystem_error(
        self,
        message: impl Into<String>,
        path: Option<std::path::PathBuf>,
    ) -> SwagResult<T>
    where
        E: Into<std::io::Error>,
    {
        self.map_err(|e| SwagError::filesystem_error_with_source(message, path, e.into()))
    }

    fn with_config_error(self, message: impl Into<String>) -> SwagResult<T>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.map_err(|e| SwagError::config_error_with_source(message, e))
    }
}

/// Helpers for async functions
pub mod async_helpers {
    use super::{SwagError, SwagResult};
    use std::future::Future;

    /// Run a future, failing with [`SwagError::Timeout`] when it takes too long
    pub async fn with_timeout<F, T>(f: F, timeout_secs: u64) -> SwagResult<T>
    where
        F: Future<Output = SwagResult<T>>,
    {
        let timeout_duration = std::time::Duration::from_secs(timeout_secs);

        match tokio::time::timeout(timeout_duration, f).await {
            Ok(result) => result,
            Err(_) => Err(SwagError::timeout(timeout_secs)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_result_ext_with_filesystem_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let result: Result<String, std::io::Error> = Err(io_error);
        let path = Some(PathBuf::from("/test/path"));

        let swag_result = result.with_filesystem_error("test operation", path.clone());
        if let Err(SwagError::FileSystemError { path: p, .. }) = swag_result {
            assert_eq!(p, path);
        } else {
            panic!("Expected FileSystemError");
        }
    }

    #[tokio::test]
    async fn test_async_helpers_with_timeout() {
        use super::async_helpers::*;

        let fast_future = async { Ok("result".to_string()) };
        assert!(with_timeout(fast_future, 1).await.is_ok());

        let slow_future = async {
            tokio::time::sleep(std::time::Duration::from_secs(2)).await;
            Ok("result".to_string())
        };
        let result = with_timeout(slow_future, 1).await;
        assert!(matches!(result, Err(SwagError::Timeout { timeout_secs: 1 })));
    }
}
