use std::path::Path;

use quiz_forge::error::ExtractionError;
use quiz_forge::extract::{ContentInput, Extractors, SourceFormat, TextExtractor, Upload};
use quiz_forge::QuizError;

fn text_upload(bytes: &[u8]) -> Upload {
    Upload::new("notes.txt", SourceFormat::PlainText, bytes.to_vec())
}

#[test]
fn format_from_mime_type() {
    assert_eq!(SourceFormat::from_mime("application/pdf"), SourceFormat::Pdf);
    assert_eq!(SourceFormat::from_mime("image/png"), SourceFormat::Image);
    assert_eq!(SourceFormat::from_mime(" IMAGE/JPEG "), SourceFormat::Image);
    assert_eq!(SourceFormat::from_mime("text/plain"), SourceFormat::PlainText);
    assert_eq!(SourceFormat::from_mime("text/markdown"), SourceFormat::PlainText);
    assert_eq!(SourceFormat::from_mime(""), SourceFormat::PlainText);
}

#[test]
fn format_from_extension() {
    assert_eq!(SourceFormat::from_path(Path::new("lecture.PDF")), SourceFormat::Pdf);
    assert_eq!(SourceFormat::from_path(Path::new("board.jpeg")), SourceFormat::Image);
    assert_eq!(SourceFormat::from_path(Path::new("notes.md")), SourceFormat::PlainText);
    assert_eq!(SourceFormat::from_path(Path::new("README")), SourceFormat::PlainText);
}

#[tokio::test]
async fn pasted_text_passes_through() {
    let extractors = Extractors::default();
    let text = extractors
        .acquire(ContentInput::Text("  The mitochondria is the powerhouse.  ".into()))
        .await
        .unwrap();
    assert_eq!(text, "  The mitochondria is the powerhouse.  ");
}

#[tokio::test]
async fn text_upload_is_decoded() {
    let extractors = Extractors::default();
    let text = extractors
        .acquire(ContentInput::Upload(text_upload("Cells divide by mitosis.\n".as_bytes())))
        .await
        .unwrap();
    assert_eq!(text, "Cells divide by mitosis.\n");
}

#[tokio::test]
async fn byte_order_mark_is_dropped() {
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(b"Hello");
    let text = Extractors::default().plain_text.extract(&text_upload(&bytes)).await.unwrap();
    assert_eq!(text, "Hello");
}

#[tokio::test]
async fn invalid_utf8_is_rejected() {
    let err = Extractors::default()
        .acquire(ContentInput::Upload(text_upload(&[0xff, 0xfe, 0x00, 0x41])))
        .await
        .unwrap_err();
    assert!(matches!(err, QuizError::Extraction(ExtractionError::InvalidText)));
    assert_eq!(err.user_message(), "Failed to process the uploaded file. Please try another file.");
}

#[tokio::test]
async fn whitespace_only_upload_is_empty() {
    let err = Extractors::default()
        .acquire(ContentInput::Upload(text_upload(b" \n\t\n")))
        .await
        .unwrap_err();
    assert!(matches!(err, QuizError::Extraction(ExtractionError::Empty(ref name)) if name == "notes.txt"));
    assert_eq!(err.user_message(), "The file appears to be empty or contains no extractable text.");
}

#[tokio::test]
async fn images_have_no_text_recognition() {
    let upload = Upload::new("board.png", SourceFormat::Image, vec![0x89, b'P', b'N', b'G']);
    let err = Extractors::default()
        .acquire(ContentInput::Upload(upload))
        .await
        .unwrap_err();
    assert!(matches!(err, QuizError::Extraction(ExtractionError::OcrUnavailable)));
}

#[tokio::test]
async fn missing_pdf_program_is_reported() {
    let extractors = Extractors::with_pdf_program("quiz-forge-no-such-pdftotext");
    let upload = Upload::new("lecture.pdf", SourceFormat::Pdf, b"%PDF-1.4\n%%EOF\n".to_vec());
    let err = extractors.acquire(ContentInput::Upload(upload)).await.unwrap_err();
    assert!(matches!(err, QuizError::Extraction(ExtractionError::Program(_))));
}

#[tokio::test]
async fn upload_from_path_reads_the_file() {
    let path = std::env::temp_dir().join(format!("quiz_forge_upload_{}.md", std::process::id()));
    tokio::fs::write(&path, "# Notes\nWater boils at 100C.").await.unwrap();

    let upload = Upload::from_path(&path).await.unwrap();
    assert_eq!(upload.format, SourceFormat::PlainText);
    let text = Extractors::default().acquire(ContentInput::Upload(upload)).await.unwrap();
    assert!(text.contains("Water boils"));

    tokio::fs::remove_file(&path).await.unwrap();
}

#[tokio::test]
async fn upload_from_missing_path_is_an_io_error() {
    let err = Upload::from_path(Path::new("/definitely/not/here.txt")).await.unwrap_err();
    assert!(matches!(err, ExtractionError::Io(_)));
}
