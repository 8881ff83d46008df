use asset_upload_http::{UploadClient, UploadConfig, UploadRequest};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let url = std::env::var("UPLOAD_URL")?;
    let file = std::env::var("UPLOAD_FILE")?;
    let config = match std::env::var("UPLOAD_CONFIG") {
        Ok(path) => UploadConfig::from_file(path)?,
        Err(_) => UploadConfig::new(),
    };

    let uploader = UploadClient::new(config);
    let request = UploadRequest::new(url)
        .method("POST")
        .form_field("asset[title]", "demo upload");

    let response = uploader.upload(&request, &file, None).await?;
    println!("{} {}", response.status, response.body);

    Ok(())
}
