use std::{io, path::Path};

use reqwest::{
    multipart::{Form, Part},
    Body,
};
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::{Result, UploadError};

/// Builds the multipart body for one attempt.
///
/// The file is reopened on every call: a stream consumed by a failed send
/// cannot be rewound.
pub(crate) async fn build_upload_form(
    form_data: &[(String, String)],
    upload_field: &str,
    path: &Path,
) -> Result<Form> {
    let file_error = |source: io::Error| UploadError::File {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).await.map_err(file_error)?;
    let metadata = file.metadata().await.map_err(file_error)?;
    if !metadata.is_file() {
        return Err(file_error(io::Error::new(
            io::ErrorKind::InvalidInput,
            "not a regular file",
        )));
    }

    let body = Body::wrap_stream(ReaderStream::new(file));
    let mut part = Part::stream_with_length(body, metadata.len());
    if let Some(name) = path.file_name() {
        part = part.file_name(name.to_string_lossy().into_owned());
    }

    // The file part owns the upload field name.
    let form = form_data
        .iter()
        .filter(|(name, _)| name != upload_field)
        .fold(Form::new(), |form, (name, value)| {
            form.text(name.clone(), value.clone())
        });

    Ok(form.part(upload_field.to_owned(), part))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::build_upload_form;
    use crate::UploadError;

    #[tokio::test]
    async fn missing_file_is_file_error() {
        let path = Path::new("/definitely/not/here.png");
        let err = build_upload_form(&[], "asset[upload]", path)
            .await
            .expect_err("must fail");
        match err {
            UploadError::File { path: failed, .. } => assert_eq!(failed, path),
            other => panic!("expected file error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn directory_is_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = build_upload_form(&[], "asset[upload]", dir.path())
            .await
            .expect_err("must fail");
        assert!(matches!(err, UploadError::File { .. }));
    }

    #[tokio::test]
    async fn regular_file_builds_form() {
        let file = tempfile::NamedTempFile::new().expect("temp file");
        std::fs::write(file.path(), b"png bytes").expect("write file");
        let fields = vec![("asset[title]".to_owned(), "cover".to_owned())];
        build_upload_form(&fields, "asset[upload]", file.path())
            .await
            .expect("form must build");
    }
}
