//! Hand-built `multipart/form-data` bodies.
//!
//! The request body is assembled byte for byte so what goes on the wire is fully
//! controlled here rather than by the HTTP client's form support.

use bytes::{BufMut, Bytes, BytesMut};
use imgbed_core::SourceFile;
use rand::distr::Alphanumeric;
use rand::Rng;

const BOUNDARY_PREFIX: &str = "----ImgbedFormBoundary";
const BOUNDARY_RANDOM_LEN: usize = 16;
const CRLF: &[u8] = b"\r\n";

/// An encoded single-part body and the boundary that delimits it.
#[derive(Clone, Debug)]
pub struct MultipartBody {
    pub body: Bytes,
    pub boundary: String,
}

impl MultipartBody {
    /// Value for the request's `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }
}

pub struct MultipartEncoder;

impl MultipartEncoder {
    /// Encode `file` as the only part of a form, under `field_name`.
    pub fn encode(field_name: &str, file: &SourceFile) -> MultipartBody {
        Self::encode_with_boundary(field_name, file, generate_boundary())
    }

    pub fn encode_with_boundary(
        field_name: &str,
        file: &SourceFile,
        boundary: String,
    ) -> MultipartBody {
        let header = format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
            escape_quoted(field_name),
            escape_quoted(file.name()),
            header_value(file.mime_type())
        );

        let payload = file.data();
        let mut body = BytesMut::with_capacity(
            boundary.len() * 2 + header.len() + payload.len() + 16,
        );
        body.put_slice(b"--");
        body.put_slice(boundary.as_bytes());
        body.put_slice(CRLF);
        body.put_slice(header.as_bytes());
        body.put_slice(payload);
        body.put_slice(CRLF);
        body.put_slice(b"--");
        body.put_slice(boundary.as_bytes());
        body.put_slice(b"--");
        body.put_slice(CRLF);

        MultipartBody {
            body: body.freeze(),
            boundary,
        }
    }
}

fn generate_boundary() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(BOUNDARY_RANDOM_LEN)
        .map(char::from)
        .collect();
    format!("{}{}", BOUNDARY_PREFIX, suffix)
}

// Same escaping browsers apply to quoted form-data parameters.
fn escape_quoted(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

// Control characters would end the header line early.
fn header_value(value: &str) -> String {
    value.chars().filter(|c| !c.is_control()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_layout() {
        let file = SourceFile::new("cat.png", "image/png", b"PNGDATA".to_vec());
        let encoded = MultipartEncoder::encode_with_boundary("file", &file, "XYZ".to_string());

        let expected = "--XYZ\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"cat.png\"\r\n\
             Content-Type: image/png\r\n\
             \r\n\
             PNGDATA\r\n\
             --XYZ--\r\n";
        assert_eq!(encoded.body.as_ref(), expected.as_bytes());
        assert_eq!(encoded.content_type(), "multipart/form-data; boundary=XYZ");
    }

    #[test]
    fn test_binary_payload_is_untouched() {
        let payload: Vec<u8> = (0..=255u8).collect();
        let file = SourceFile::new("raw.jpg", "image/jpeg", payload.clone());
        let encoded = MultipartEncoder::encode_with_boundary("file", &file, "B".to_string());

        let body = encoded.body.as_ref();
        let start = body
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .unwrap()
            + 4;
        assert_eq!(&body[start..start + payload.len()], payload.as_slice());
    }

    #[test]
    fn test_random_boundary() {
        let file = SourceFile::new("a.png", "image/png", vec![1]);
        let first = MultipartEncoder::encode("file", &file);
        let second = MultipartEncoder::encode("file", &file);

        assert!(first.boundary.starts_with(BOUNDARY_PREFIX));
        assert_eq!(
            first.boundary.len(),
            BOUNDARY_PREFIX.len() + BOUNDARY_RANDOM_LEN
        );
        assert_ne!(first.boundary, second.boundary);
    }

    #[test]
    fn test_filename_quotes_escaped() {
        let file = SourceFile::new("we\"ird\r\n.png", "image/png", vec![1]);
        let encoded = MultipartEncoder::encode_with_boundary("file", &file, "B".to_string());
        let text = String::from_utf8_lossy(&encoded.body);
        assert!(text.contains("filename=\"we%22ird%0D%0A.png\""));
    }

    #[test]
    fn test_content_type_cannot_add_headers() {
        let file = SourceFile::new("a.png", "image/png\r\nX-Evil: 1", vec![1]);
        let encoded = MultipartEncoder::encode_with_boundary("file", &file, "B".to_string());
        let text = String::from_utf8_lossy(&encoded.body);

        assert!(!text.contains("\r\nX-Evil"));
        assert!(text.contains("Content-Type: image/pngX-Evil: 1\r\n\r\n"));
    }
}
