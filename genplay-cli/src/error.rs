//! Error handling for the GenPlay CLI

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for GenPlay CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Parsing error in {file}: {message}")]
    Parse { file: String, message: String },

    #[error("Invalid value for {argument}: {message}")]
    Validation { argument: String, message: String },

    #[error("Track operation failed: {message}")]
    Operation { message: String },

    #[error("Cannot translate position: {message}")]
    Translation { message: String },
}

impl CliError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    pub fn parse<S: Into<String>>(file: S, message: S) -> Self {
        Self::Parse {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn validation<S: Into<String>>(argument: S, message: S) -> Self {
        Self::Validation {
            argument: argument.into(),
            message: message.into(),
        }
    }

    pub fn operation<S: Into<String>>(message: S) -> Self {
        Self::Operation { message: message.into() }
    }

    pub fn translation<S: Into<String>>(message: S) -> Self {
        Self::Translation { message: message.into() }
    }
}

impl From<genplay_core::OperationError> for CliError {
    fn from(err: genplay_core::OperationError) -> Self {
        Self::operation(err.to_string())
    }
}

impl From<genplay_core::TranslationError> for CliError {
    fn from(err: genplay_core::TranslationError) -> Self {
        Self::translation(err.to_string())
    }
}

/// Provide helpful error messages and suggestions
pub fn format_error_with_suggestions(error: &CliError) -> String {
    let mut message = error.to_string();

    match error {
        CliError::FileNotFound { path } => {
            message.push_str(&format!(
                "\n\nSuggestions:\n\
                 • Check that the file path is correct: {}\n\
                 • Ensure you have read permissions for the file\n\
                 • Compressed bedGraph files must end in .gz",
                path.display()
            ));
        }

        CliError::Parse { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • bedGraph lines need four columns: chrom start stop score\n\
                 • Offset lines need five columns: genome allele chromosome position delta\n\
                 • Lines starting with '#' are ignored",
            );
        }

        CliError::Config { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check your genplay.toml configuration file\n\
                 • Use 'genplay config --example' to generate a sample configuration\n\
                 • Verify that all configuration values are valid",
            );
        }

        CliError::Translation { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check the genome name against the offsets file\n\
                 • Diploid genomes use allele01 or allele02, reference genomes use reference",
            );
        }

        CliError::Operation { message: detail } if detail.contains("same chromosomes") => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Both tracks must list the same chromosomes in the same order",
            );
        }

        _ => {}
    }

    message
}

/// Print error with helpful suggestions and exit
pub fn print_error_and_exit(error: &CliError) -> ! {
    eprintln!("Error: {}", format_error_with_suggestions(error));
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = CliError::config("test message");
        assert!(matches!(err, CliError::Config { .. }));
        assert_eq!(err.to_string(), "Configuration error: test message");
    }

    #[test]
    fn test_error_suggestions() {
        let err = CliError::file_not_found(PathBuf::from("track.bedgraph"));
        let formatted = format_error_with_suggestions(&err);
        assert!(formatted.contains("Suggestions:"));
        assert!(formatted.contains("Check that the file path is correct"));
    }

    #[test]
    fn test_core_error_conversion() {
        let err: CliError = genplay_core::OperationError::MismatchedChromosomes("x".to_string()).into();
        assert!(matches!(err, CliError::Operation { .. }));
        assert!(format_error_with_suggestions(&err).contains("same order"));

        let err: CliError = genplay_core::TranslationError::UnknownGenome("hg38".to_string()).into();
        assert_eq!(err.to_string(), "Cannot translate position: Unknown genome: hg38");
    }
}
