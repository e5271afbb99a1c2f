pub mod batch_query;
pub mod judge;
pub mod llm;
pub mod plots;
pub mod questions;
pub mod report;
pub mod retry;

pub use batch_query::{BatchQueryRunner, BatchSummary};
pub use judge::{BatchJudge, Evaluation, JudgeError, JudgeReport, Verdict, build_messages};
pub use llm::{ChatClient, ChatMessage, ChatModel, LlmError};
pub use plots::plot_win_tally;
pub use questions::{InputError, load_answers, parse_question_file, read_question_file, solana_question_set};
pub use report::{CriterionTally, WinTally, write_jsonl};
pub use retry::{Backoff, RetryOutcome, RetryPolicy};
