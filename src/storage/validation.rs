use bytes::Bytes;

use crate::types::{AppError, AppResult};

/// A file pulled out of a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

const MIB: usize = 1024 * 1024;

fn describe_limit(max_bytes: usize) -> String {
    if max_bytes % MIB == 0 {
        format!("{}MB", max_bytes / MIB)
    } else {
        format!("{} bytes", max_bytes)
    }
}

/// The 400 answered for a file over the upload ceiling.
pub fn file_too_large(max_bytes: usize) -> AppError {
    AppError::InvalidRequest(format!(
        "File size must be less than {}",
        describe_limit(max_bytes)
    ))
}

/// Checks presence, type and size before anything is written.
pub fn validate_upload(file: Option<UploadedFile>, max_bytes: usize) -> AppResult<UploadedFile> {
    let file = match file {
        Some(file) if !file.data.is_empty() => file,
        _ => return Err(AppError::InvalidRequest("No file provided".to_string())),
    };

    let is_pdf = file
        .content_type
        .as_deref()
        .and_then(|ct| ct.parse::<mime::Mime>().ok())
        .map(|m| m.essence_str() == mime::APPLICATION_PDF.essence_str())
        .unwrap_or(false);
    if !is_pdf {
        return Err(AppError::InvalidRequest(
            "Only PDF files are allowed".to_string(),
        ));
    }

    if file.data.len() > max_bytes {
        return Err(file_too_large(max_bytes));
    }

    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MAX_UPLOAD_BYTES;

    fn pdf(len: usize) -> UploadedFile {
        UploadedFile {
            file_name: "plan.pdf".to_string(),
            content_type: Some("application/pdf".to_string()),
            data: Bytes::from(vec![b'%'; len]),
        }
    }

    fn message(err: AppError) -> String {
        match err {
            AppError::InvalidRequest(msg) => msg,
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_accepts_pdf_within_limit() {
        let file = validate_upload(Some(pdf(1024)), DEFAULT_MAX_UPLOAD_BYTES).unwrap();
        assert_eq!(file.data.len(), 1024);
    }

    #[test]
    fn test_missing_or_empty_file() {
        assert_eq!(message(validate_upload(None, 10).unwrap_err()), "No file provided");
        assert_eq!(message(validate_upload(Some(pdf(0)), 10).unwrap_err()), "No file provided");
    }

    #[test]
    fn test_rejects_other_types() {
        let mut file = pdf(10);
        file.content_type = Some("image/png".to_string());
        assert_eq!(
            message(validate_upload(Some(file), 100).unwrap_err()),
            "Only PDF files are allowed"
        );

        let mut file = pdf(10);
        file.content_type = None;
        assert!(validate_upload(Some(file), 100).is_err());
    }

    #[test]
    fn test_content_type_parameters_ignored() {
        let mut file = pdf(10);
        file.content_type = Some("application/pdf; name=plan.pdf".to_string());
        assert!(validate_upload(Some(file), 100).is_ok());
    }

    #[test]
    fn test_rejects_oversize() {
        let err = validate_upload(Some(pdf(DEFAULT_MAX_UPLOAD_BYTES + 1)), DEFAULT_MAX_UPLOAD_BYTES)
            .unwrap_err();
        assert_eq!(message(err), "File size must be less than 10MB");

        let err = validate_upload(Some(pdf(2048)), 1000).unwrap_err();
        assert_eq!(message(err), "File size must be less than 1000 bytes");
    }
}
