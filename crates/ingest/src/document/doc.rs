use std::process::Command;

use super::ExtractionError;

/// Legacy .doc extraction via the external `antiword` backend.
///
/// The binary format has no maintained pure-Rust parser; the bytes are
/// written to a temp file and handed to antiword.
pub fn extract_doc(bytes: &[u8]) -> Result<String, ExtractionError> {
    let temp_path = std::env::temp_dir().join(format!("extract_{}.doc", uuid::Uuid::new_v4()));
    std::fs::write(&temp_path, bytes)
        .map_err(|e| ExtractionError::failed("doc", format!("failed to write temp file: {e}")))?;

    let output = Command::new("antiword").arg("-w").arg("0").arg(&temp_path).output();

    // Clean up temp file before inspecting the result
    let _ = std::fs::remove_file(&temp_path);

    let output = output
        .map_err(|e| ExtractionError::failed("doc", format!("failed to run antiword: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ExtractionError::failed(
            "doc",
            format!("antiword failed: {}", stderr.trim()),
        ));
    }

    let text = String::from_utf8_lossy(&output.stdout).into_owned();
    Ok(text.trim().to_string())
}
