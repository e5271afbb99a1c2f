pub mod cypher;
pub mod pipeline;
pub mod response;
pub mod tokenizer;

pub use cypher::{LabelQuoting, build_cypher_query};
pub use pipeline::{QueryCycle, QueryError, QueryOutcome};
pub use response::{EngineResponse, References, SUCCESS_MARKER, extract_references, filter_query_output};
pub use tokenizer::{GroupTokenizer, TokenizerState};
