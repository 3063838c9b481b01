#![deny(clippy::all)]

pub mod config;
pub mod cons;
pub mod llm;
#[cfg(feature = "node")]
mod ffi;


use std::sync::Once;

pub use config::AiSettings;
pub use cons::provider_cons::{ProviderConfig, ProviderId, PROVIDER_REGISTRY};
pub use llm::models::provider_base::{ErrorKind, GenerationOptions, Message, NeutralResponse, Role};
pub use llm::service::{AiService, ProviderStatus};
pub use llm::synthesis::{
    synthesize, synthesize_and_save, AnalysisType, NoteSink, SourceItem, SourceType,
    SynthesisRequest, SynthesisResult,
};

static INIT: Once = Once::new();

pub fn init_logger() {
    INIT.call_once(|| {
        use log::LevelFilter;
        use log4rs::append::file::FileAppender;
        use log4rs::config::{Appender, Config, Root};
        use log4rs::encode::pattern::PatternEncoder;

        // An explicit log4rs file wins over the built-in appender
        let config_path = std::env::var("LOG4RS_CONFIG").unwrap_or_else(|_| "log4rs.yaml".to_string());
        if log4rs::init_file(&config_path, Default::default()).is_ok() {
            println!("[INIT] Logger initialized from {}", config_path);
            return;
        }

        let _ = std::fs::create_dir_all("logs");
        let pattern = "{d(%Y-%m-%d %H:%M:%S)} [{l}] {t} - {m}\n";

        let logfile = match FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(pattern)))
            .build("logs/webnote-ai.log")
        {
            Ok(f) => f,
            Err(e) => {
                println!("[INIT] Failed to create log file: {}", e);
                return;
            }
        };

        let config = match Config::builder()
            .appender(Appender::builder().build("logfile", Box::new(logfile)))
            .build(Root::builder().appender("logfile").build(LevelFilter::Info))
        {
            Ok(c) => c,
            Err(e) => {
                println!("[INIT] Failed to build config: {}", e);
                return;
            }
        };

        match log4rs::init_config(config) {
            Ok(_) => println!("[INIT] Logger initialized successfully"),
            Err(e) => println!("[INIT] Failed to initialize logger: {}", e),
        }
    });
}

#[cfg(feature = "node")]
pub use ffi::*;
