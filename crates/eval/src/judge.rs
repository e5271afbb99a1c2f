use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::llm::{ChatMessage, ChatModel, LlmError};
use crate::retry::{RetryOutcome, RetryPolicy};

#[derive(Debug, Error)]
pub enum JudgeError {
    #[error(
        "the number of queries and answers does not match: {queries} queries, {answers1} and {answers2} answers"
    )]
    CountMismatch {
        queries: usize,
        answers1: usize,
        answers2: usize,
    },

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("judge reply is not a valid evaluation: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    #[serde(rename = "Winner")]
    pub winner: String,
    #[serde(rename = "Explanation")]
    pub explanation: String,
}

/// One comparison of two answers, in the key layout the judge is asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    #[serde(rename = "Accuracy")]
    pub accuracy: Verdict,
    #[serde(rename = "Comprehensiveness")]
    pub comprehensiveness: Verdict,
    #[serde(rename = "Diversity")]
    pub diversity: Verdict,
    #[serde(rename = "Empowerment")]
    pub empowerment: Verdict,
    #[serde(rename = "Hallucination")]
    pub hallucination: Verdict,
    #[serde(rename = "Overall Winner")]
    pub overall_winner: Verdict,
}

impl Evaluation {
    pub fn verdicts(&self) -> [(&'static str, &Verdict); 6] {
        [
            ("Accuracy", &self.accuracy),
            ("Comprehensiveness", &self.comprehensiveness),
            ("Diversity", &self.diversity),
            ("Empowerment", &self.empowerment),
            ("Hallucination", &self.hallucination),
            ("Overall Winner", &self.overall_winner),
        ]
    }
}

const SYSTEM_PROMPT: &str = r#"---Role---
You are an expert tasked with evaluating two answers to the same question based on five criteria: **Accuracy**, **Comprehensiveness**, **Diversity**, **Empowerment**, and **Hallucination**."#;

pub fn build_judge_prompt(query: &str, answer1: &str, answer2: &str) -> String {
    format!(
        r#"You will evaluate two answers to the same question based on five criteria: **Accuracy**, **Comprehensiveness**, **Diversity**, **Empowerment**, and **Hallucination**.

- **Accuracy**: How correct and factual is the information provided in the answer?
- **Comprehensiveness**: How much detail does the answer provide to cover all aspects and details of the question?
- **Diversity**: How varied and rich is the answer in providing different perspectives and insights on the question?
- **Empowerment**: How well does the answer help the reader understand and make informed judgments about the topic?
- **Hallucination**: How free is the answer from fabricated or unsupported information?

For each criterion, choose the better answer (either Answer 1 or Answer 2) and explain why. Then, select an overall winner based on these five categories.

Here is the question:
{query}

Here are the two answers:

**Answer 1:**
{answer1}

**Answer 2:**
{answer2}

Evaluate both answers using the five criteria listed above and provide detailed explanations for each criterion.

Output your evaluation in the following JSON format, do not contain the "json" identifier at the beginning and end!!!:

{{
    "Accuracy": {{
        "Winner": "[Answer 1 or Answer 2]",
        "Explanation": "[Provide explanation here]"
    }},
    "Comprehensiveness": {{
        "Winner": "[Answer 1 or Answer 2]",
        "Explanation": "[Provide explanation here]"
    }},
    "Diversity": {{
        "Winner": "[Answer 1 or Answer 2]",
        "Explanation": "[Provide explanation here]"
    }},
    "Empowerment": {{
        "Winner": "[Answer 1 or Answer 2]",
        "Explanation": "[Provide explanation here]"
    }},
    "Hallucination": {{
        "Winner": "[Answer 1 or Answer 2]",
        "Explanation": "[Provide explanation here]"
    }},
    "Overall Winner": {{
        "Winner": "[Answer 1 or Answer 2]",
        "Explanation": "[Summarize why this answer is the overall winner based on the five criteria]"
    }}
}}

The output should not contain any extra characters or text outside of this JSON structure.
Do NOT contain the "json" identifier at the beginning and end."#
    )
}

pub fn build_messages(query: &str, answer1: &str, answer2: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(build_judge_prompt(query, answer1, answer2)),
    ]
}

/// Evaluations that came back, plus the 1-based positions that were dropped.
#[derive(Debug, Default)]
pub struct JudgeReport {
    pub evaluations: Vec<Evaluation>,
    pub dropped: Vec<usize>,
}

/// Pairwise LLM-as-judge over aligned query/answer lists.
pub struct BatchJudge<'a, M> {
    model: &'a M,
    retry: RetryPolicy,
}

impl<'a, M: ChatModel> BatchJudge<'a, M> {
    /// Three attempts, one second apart.
    pub fn new(model: &'a M) -> Self {
        Self::with_retry(model, RetryPolicy::fixed(3, Duration::from_secs(1)))
    }

    pub fn with_retry(model: &'a M, retry: RetryPolicy) -> Self {
        Self { model, retry }
    }

    /// Ask for one verdict; a reply that does not parse is requested again.
    pub async fn judge(&self, query: &str, answer1: &str, answer2: &str) -> RetryOutcome<Evaluation, JudgeError> {
        let messages = build_messages(query, answer1, answer2);
        let messages = messages.as_slice();
        let model = self.model;

        self.retry
            .run("judge", move |_| async move {
                let reply = model.complete(messages).await?;
                Ok::<_, JudgeError>(serde_json::from_str::<Evaluation>(reply.trim())?)
            })
            .await
    }

    /// Judge every record in order. Records that still fail after the retries
    /// are dropped and the batch moves on.
    pub async fn evaluate_all(
        &self,
        queries: &[String],
        answers1: &[String],
        answers2: &[String],
    ) -> Result<JudgeReport, JudgeError> {
        if queries.len() != answers1.len() || queries.len() != answers2.len() {
            return Err(JudgeError::CountMismatch {
                queries: queries.len(),
                answers1: answers1.len(),
                answers2: answers2.len(),
            });
        }

        let total = queries.len();
        let mut report = JudgeReport::default();

        for (i, ((query, answer1), answer2)) in queries.iter().zip(answers1).zip(answers2).enumerate() {
            let position = i + 1;
            match self.judge(query, answer1, answer2).await {
                RetryOutcome::Succeeded { value, attempts } => {
                    info!(position, total, attempts, "Evaluated record");
                    println!("Successfully evaluated {}/{}", position, total);
                    report.evaluations.push(value);
                }
                RetryOutcome::GaveUp { last_error, attempts } => {
                    warn!(position, total, attempts, error = %last_error, "Dropping record");
                    println!("Failed after maximum retries ({}/{})", position, total);
                    report.dropped.push(position);
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    pub(crate) fn verdict_json(winner: &str) -> String {
        format!(r#"{{"Winner": "{}", "Explanation": "because"}}"#, winner)
    }

    pub(crate) fn evaluation_json(winner: &str) -> String {
        format!(
            r#"{{"Accuracy": {v}, "Comprehensiveness": {v}, "Diversity": {v}, "Empowerment": {v}, "Hallucination": {v}, "Overall Winner": {v}}}"#,
            v = verdict_json(winner)
        )
    }

    /// Replies from a fixed script, one per call.
    struct ScriptedModel {
        replies: Mutex<Vec<String>>,
        calls: Mutex<usize>,
    }

    impl ScriptedModel {
        fn new(replies: &[&str]) -> Self {
            let mut replies: Vec<String> = replies.iter().map(|r| r.to_string()).collect();
            replies.reverse();
            Self {
                replies: Mutex::new(replies),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    impl ChatModel for ScriptedModel {
        async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, LlmError> {
            *self.calls.lock().unwrap() += 1;
            let reply = self.replies.lock().unwrap().pop();
            reply.ok_or(LlmError::EmptyCompletion)
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn no_delay(model: &ScriptedModel) -> BatchJudge<'_, ScriptedModel> {
        BatchJudge::with_retry(model, RetryPolicy::fixed(3, Duration::ZERO))
    }

    #[test]
    fn test_prompt_embeds_question_and_answers() {
        let messages = build_messages("What is SOL?", "A token.", "A coin.");

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
        assert!(messages[1].content.contains("Here is the question:\nWhat is SOL?"));
        assert!(messages[1].content.contains("**Answer 1:**\nA token."));
        assert!(messages[1].content.contains("**Answer 2:**\nA coin."));
        assert!(messages[1].content.contains(r#""Overall Winner": {"#));
    }

    #[test]
    fn test_evaluation_keeps_key_names() {
        let evaluation: Evaluation = serde_json::from_str(&evaluation_json("Answer 2")).unwrap();
        assert_eq!(evaluation.overall_winner.winner, "Answer 2");

        let value = serde_json::to_value(&evaluation).unwrap();
        assert_eq!(value["Overall Winner"]["Winner"], "Answer 2");
        assert_eq!(value["Hallucination"]["Explanation"], "because");
    }

    #[tokio::test]
    async fn test_retries_invalid_json_then_succeeds() {
        let good = evaluation_json("Answer 1");
        let model = ScriptedModel::new(&["Sure! Here is my evaluation:", &good]);

        let outcome = no_delay(&model).judge("q", "a", "b").await;

        assert_eq!(outcome.attempts(), 2);
        assert_eq!(outcome.into_result().unwrap().accuracy.winner, "Answer 1");
    }

    #[tokio::test]
    async fn test_drops_record_after_three_failures_and_continues() {
        let good = evaluation_json("Answer 2");
        let model = ScriptedModel::new(&["nope", "{", "still not json", &good]);

        let report = no_delay(&model)
            .evaluate_all(&strings(&["q1", "q2"]), &strings(&["a1", "a2"]), &strings(&["b1", "b2"]))
            .await
            .unwrap();

        assert_eq!(model.calls(), 4);
        assert_eq!(report.dropped, vec![1]);
        assert_eq!(report.evaluations.len(), 1);
        assert_eq!(report.evaluations[0].overall_winner.winner, "Answer 2");
    }

    #[tokio::test]
    async fn test_count_mismatch_stops_before_any_call() {
        let model = ScriptedModel::new(&[]);

        let err = no_delay(&model)
            .evaluate_all(&strings(&["q1", "q2"]), &strings(&["a1"]), &strings(&["b1", "b2"]))
            .await
            .unwrap_err();

        assert!(matches!(err, JudgeError::CountMismatch { queries: 2, answers1: 1, answers2: 2 }));
        assert_eq!(model.calls(), 0);
    }
}
