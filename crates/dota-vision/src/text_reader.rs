use anyhow::{bail, Context, Result};
use image::GrayImage;
use std::process::Command;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::slot::Recognizer;

/// Characters that occur in hero names, plus the digits Tesseract tends to
/// read in place of similar-looking letters
const CHARACTER_WHITELIST: &str =
    "abcdefghijklmnopqrstuvwxyz ABCDEFGHIJKLMNOPQRSTUVWXYZ012458";

/// Reads hero names from isolated slot images using Tesseract OCR.
/// Falls back gracefully when Tesseract is not installed.
pub struct TesseractReader {
    tesseract_available: bool,
}

impl TesseractReader {
    pub fn new() -> Self {
        let tesseract_available = check_tesseract();
        if tesseract_available {
            debug!("Tesseract OCR available");
        } else {
            warn!("Tesseract not found. OCR disabled. Install tesseract and make sure it is on PATH");
        }

        Self { tesseract_available }
    }

    /// Check if OCR is available
    pub fn is_available(&self) -> bool {
        self.tesseract_available
    }

    /// Run Tesseract on an isolated slot image
    fn run_tesseract(&self, image: &GrayImage) -> Result<String> {
        // A fresh file per call keeps concurrent readers apart
        let input = NamedTempFile::with_suffix(".png").context("Failed to create temp file")?;
        image
            .save(input.path())
            .context("Failed to write OCR input")?;

        let output = Command::new("tesseract")
            .arg(input.path())
            .arg("stdout")
            .arg("--psm")
            .arg("7") // Single text line
            .arg("-c")
            .arg(format!("tessedit_char_whitelist={}", CHARACTER_WHITELIST))
            .output()
            .context("Failed to run tesseract")?;

        if !output.status.success() {
            bail!(
                "tesseract exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let text = String::from_utf8(output.stdout).context("tesseract output is not UTF-8")?;
        Ok(text.trim().to_string())
    }
}

impl Default for TesseractReader {
    fn default() -> Self {
        Self::new()
    }
}

impl Recognizer for TesseractReader {
    fn recognize(&self, image: &GrayImage) -> String {
        if !self.tesseract_available {
            return String::new();
        }

        match self.run_tesseract(image) {
            Ok(text) => substitute_digits(&text),
            Err(e) => {
                debug!("OCR failed: {:#}", e);
                String::new()
            }
        }
    }
}

/// Map digits Tesseract confuses with capital letters back to those letters
pub fn substitute_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '5' => 'S',
            '1' => 'I',
            '0' => 'O',
            '2' => 'Z',
            '4' => 'A',
            '8' => 'B',
            other => other,
        })
        .collect()
}

/// Check if Tesseract is installed and accessible
fn check_tesseract() -> bool {
    Command::new("tesseract")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
