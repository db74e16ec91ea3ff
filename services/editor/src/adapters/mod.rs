pub mod completion_llm;
pub mod gist;
pub mod local_files;
pub mod token_cache;

pub use completion_llm::OpenAiCompletionAdapter;
pub use gist::GistAdapter;
pub use local_files::LocalFileAdapter;
pub use token_cache::FileTokenStore;
