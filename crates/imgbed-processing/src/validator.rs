use imgbed_core::{SourceFile, UploadConfiguration, UploadError};

/// Pre-flight checks run before any processing or network traffic.
pub struct FileValidator;

impl FileValidator {
    /// Checks, in order: connection settings, extension allow-list, size limit.
    pub fn validate(file: &SourceFile, config: &UploadConfiguration) -> Result<(), UploadError> {
        Self::validate_connection(config)?;
        Self::validate_extension(file, config)?;
        Self::validate_file_size(file, config)?;
        Ok(())
    }

    pub fn validate_connection(config: &UploadConfiguration) -> Result<(), UploadError> {
        if config.api_url.trim().is_empty() {
            return Err(UploadError::ConfigMissing("apiUrl".to_string()));
        }
        if config.auth_code.trim().is_empty() {
            return Err(UploadError::ConfigMissing("authCode".to_string()));
        }
        Ok(())
    }

    pub fn validate_extension(
        file: &SourceFile,
        config: &UploadConfiguration,
    ) -> Result<(), UploadError> {
        let extension = file.extension();
        if !config.is_allowed_type(&extension) {
            return Err(UploadError::UnsupportedType {
                extension,
                allowed: config.allowed_file_types.clone(),
            });
        }
        Ok(())
    }

    pub fn validate_file_size(
        file: &SourceFile,
        config: &UploadConfiguration,
    ) -> Result<(), UploadError> {
        let max = config.max_file_size_bytes();
        let size = file.byte_size();
        if size > max {
            return Err(UploadError::TooLarge { size, max });
        }
        Ok(())
    }
}
