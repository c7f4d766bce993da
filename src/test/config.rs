#[cfg(test)]
mod tests {
    use serial_test::serial;

    use crate::env::load_environment;
    use crate::media::MediaUploader;

    #[test]
    #[serial]
    fn test_load_environment_skips_missing_files() {
        temp_env::with_var("APP_PROFILE", Some("test"), || {
            assert!(load_environment().is_ok());
        });
    }

    #[test]
    #[serial]
    fn test_media_uploader_requires_upload_url() {
        temp_env::with_vars(
            [
                ("MEDIA_UPLOAD_URL", None::<&str>),
                ("MEDIA_UPLOAD_PRESET", None::<&str>),
            ],
            || {
                assert!(MediaUploader::from_env().is_none());
            },
        );

        temp_env::with_vars(
            [
                ("MEDIA_UPLOAD_URL", Some("https://media.example/upload")),
                ("MEDIA_UPLOAD_PRESET", Some("practice-videos")),
            ],
            || {
                assert!(MediaUploader::from_env().is_some());
            },
        );
    }

    #[test]
    #[serial]
    fn test_media_uploader_rejects_empty_url() {
        temp_env::with_var("MEDIA_UPLOAD_URL", Some(""), || {
            assert!(MediaUploader::from_env().is_none());
        });
    }
}
