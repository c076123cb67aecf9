use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "signboard-ocr-server")]
#[command(about = "Signboard interpretation server: OCR, translation and guidance")]
#[command(version)]
pub struct Args {
    /// Host address to bind to
    #[arg(long, env = "OCR_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "OCR_PORT", default_value = "9292")]
    pub port: u16,

    /// Language passed to the OCR engine (e.g., "eng", "deu", "hin")
    #[arg(long, env = "OCR_LANGUAGE", default_value = "eng")]
    pub language: String,

    /// Maximum upload size in bytes (default: 50MB)
    #[arg(long, env = "OCR_MAX_FILE_SIZE", default_value = "52428800")]
    pub max_file_size: usize,

    /// Explicit path to the tesseract executable (searches PATH if not set)
    #[arg(long, env = "TESSERACT_CMD")]
    pub tesseract_cmd: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub language: String,
    pub max_file_size: usize,
    pub tesseract_cmd: Option<String>,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            language: args.language,
            max_file_size: args.max_file_size,
            tesseract_cmd: args.tesseract_cmd,
        }
    }
}
