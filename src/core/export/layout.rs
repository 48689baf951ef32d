//! On-disk layout of a portable case folder
//!
//! ```text
//! <output>/<case name> (Portable)/
//!     case.db
//!     case.json
//!     PortableCaseFiles/{Audio,Documents,Executable,Image,Video,Other}/<id>-<name>
//!     Reports/
//! ```

use crate::domain::{PortableCaseError, Result};
use crate::domain::context::ResultExt;
use std::fs;
use std::path::{Path, PathBuf};

pub const PORTABLE_SUFFIX: &str = " (Portable)";
pub const FILES_DIR_NAME: &str = "PortableCaseFiles";
pub const REPORTS_DIR_NAME: &str = "Reports";
pub const DATABASE_FILE_NAME: &str = "case.db";
pub const METADATA_FILE_NAME: &str = "case.json";

/// Folder a copied file is placed in, chosen by MIME type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileCategory {
    Audio,
    Documents,
    Executable,
    Image,
    Video,
    Other,
}

const DOCUMENT_MIME_TYPES: &[&str] = &[
    // office
    "application/msword",
    "application/msword2",
    "application/vnd.ms-word.document.macroenabled.12",
    "application/vnd.ms-word.template.macroenabled.12",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.template",
    "application/vnd.ms-excel",
    "application/vnd.ms-excel.sheet.macroenabled.12",
    "application/vnd.ms-excel.sheet.binary.macroenabled.12",
    "application/vnd.ms-excel.template.macroenabled.12",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.template",
    "application/vnd.ms-powerpoint",
    "application/vnd.ms-powerpoint.presentation.macroenabled.12",
    "application/vnd.ms-powerpoint.slideshow.macroenabled.12",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "application/vnd.openxmlformats-officedocument.presentationml.slideshow",
    "application/vnd.openxmlformats-officedocument.presentationml.template",
    "application/vnd.oasis.opendocument.text",
    "application/vnd.oasis.opendocument.spreadsheet",
    "application/vnd.oasis.opendocument.presentation",
    "application/vnd.oasis.opendocument.graphics",
    "application/x-msoffice",
    "application/x-ooxml",
    "application/x-tika-msoffice",
    "application/x-tika-ooxml",
    "application/vnd.visio",
    "application/vnd.ms-outlook",
    // pdf
    "application/pdf",
    "application/epub+zip",
    // html
    "text/html",
    "application/xhtml+xml",
    // rich text
    "text/rtf",
    "application/rtf",
    // plain text
    "text/plain",
    "text/csv",
    "text/css",
    "text/xml",
    "application/xml",
    "text/x-log",
    "text/markdown",
];

const EXECUTABLE_MIME_TYPES: &[&str] = &[
    "application/x-bat",
    "application/x-dosexec",
    "application/vnd.microsoft.portable-executable",
    "application/x-msdownload",
    "application/exe",
    "application/x-exe",
    "application/dos-exe",
    "vms/exe",
    "application/x-winexe",
    "application/msdos-windows",
    "application/x-msdos-program",
    "application/x-executable",
    "application/x-sharedlib",
    "application/x-mach-binary",
    "application/x-elf",
];

/// Video formats reported outside the `video/` tree
const VIDEO_MIME_TYPES: &[&str] = &[
    "application/x-shockwave-flash",
    "application/vnd.rn-realmedia",
];

/// Audio formats reported outside the `audio/` tree
const AUDIO_MIME_TYPES: &[&str] = &["application/ogg"];

impl FileCategory {
    pub const ALL: [FileCategory; 6] = [
        FileCategory::Audio,
        FileCategory::Documents,
        FileCategory::Executable,
        FileCategory::Image,
        FileCategory::Video,
        FileCategory::Other,
    ];

    pub fn folder_name(self) -> &'static str {
        match self {
            Self::Audio => "Audio",
            Self::Documents => "Documents",
            Self::Executable => "Executable",
            Self::Image => "Image",
            Self::Video => "Video",
            Self::Other => "Other",
        }
    }

    /// Missing, empty and unrecognized MIME types land in [`FileCategory::Other`]
    pub fn from_mime(mime_type: Option<&str>) -> Self {
        let Some(mime) = mime_type.map(str::trim).filter(|m| !m.is_empty()) else {
            return Self::Other;
        };
        let mime = mime.to_ascii_lowercase();
        if mime.starts_with("image/") {
            Self::Image
        } else if mime.starts_with("video/") || VIDEO_MIME_TYPES.contains(&mime.as_str()) {
            Self::Video
        } else if mime.starts_with("audio/") || AUDIO_MIME_TYPES.contains(&mime.as_str()) {
            Self::Audio
        } else if DOCUMENT_MIME_TYPES.contains(&mime.as_str()) {
            Self::Documents
        } else if EXECUTABLE_MIME_TYPES.contains(&mime.as_str()) {
            Self::Executable
        } else {
            Self::Other
        }
    }
}

/// Replaces characters that are not allowed in file names
pub fn escape_file_name(name: &str) -> String {
    let escaped: String = name
        .chars()
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if escaped.is_empty() {
        "_".to_string()
    } else {
        escaped
    }
}

/// Paths of one portable case folder
#[derive(Debug, Clone)]
pub struct CaseLayout {
    case_name: String,
    output_dir: PathBuf,
    case_dir: PathBuf,
    files_dir: PathBuf,
}

impl CaseLayout {
    /// Lays out `<output_dir>/<source_case_name> (Portable)`
    pub fn new(output_dir: impl Into<PathBuf>, source_case_name: &str) -> Self {
        let output_dir = output_dir.into();
        let case_name = format!("{}{}", source_case_name.trim(), PORTABLE_SUFFIX);
        let case_dir = output_dir.join(escape_file_name(&case_name));
        let files_dir = case_dir.join(FILES_DIR_NAME);
        Self {
            case_name,
            output_dir,
            case_dir,
            files_dir,
        }
    }

    pub fn case_name(&self) -> &str {
        &self.case_name
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn case_dir(&self) -> &Path {
        &self.case_dir
    }

    pub fn files_dir(&self) -> &Path {
        &self.files_dir
    }

    pub fn category_dir(&self, category: FileCategory) -> PathBuf {
        self.files_dir.join(category.folder_name())
    }

    /// Path stored in the database for a copied file, relative to the case folder
    pub fn relative_file_path(&self, category: FileCategory, file_name: &str) -> String {
        format!("{}/{}/{}", FILES_DIR_NAME, category.folder_name(), file_name)
    }

    pub fn database_path(&self) -> PathBuf {
        self.case_dir.join(DATABASE_FILE_NAME)
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.case_dir.join(REPORTS_DIR_NAME)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.case_dir.join(METADATA_FILE_NAME)
    }

    /// Checks that the output directory exists and the case folder does not
    ///
    /// # Errors
    ///
    /// Returns `PortableCaseError::Validation` describing the problem.
    pub fn validate_output(&self) -> Result<()> {
        if !self.output_dir.exists() {
            return Err(PortableCaseError::Validation(format!(
                "Output directory {} does not exist",
                self.output_dir.display()
            )));
        }
        if !self.output_dir.is_dir() {
            return Err(PortableCaseError::Validation(format!(
                "Output path {} is not a directory",
                self.output_dir.display()
            )));
        }
        if self.case_dir.exists() {
            return Err(PortableCaseError::Validation(format!(
                "Case folder {} already exists",
                self.case_dir.display()
            )));
        }
        Ok(())
    }

    /// Creates the case folder and the file category folders
    ///
    /// The case folder itself must not exist yet.
    pub fn create_directories(&self) -> Result<()> {
        fs::create_dir(&self.case_dir)
            .with_context(|| format!("Failed to create case folder {}", self.case_dir.display()))?;
        for category in FileCategory::ALL {
            let dir = self.category_dir(category);
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        Ok(())
    }

    pub fn create_reports_dir(&self) -> Result<PathBuf> {
        let dir = self.reports_dir();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create reports folder {}", dir.display()))?;
        Ok(dir)
    }
}
