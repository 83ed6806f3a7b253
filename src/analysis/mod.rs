pub mod extractor;
pub mod prompt;
pub mod sections;

pub use extractor::SignalExtractor;
pub use prompt::PromptBuilder;
pub use sections::SectionClassifier;
