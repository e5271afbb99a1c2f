use serde::Serialize;
use std::io::Write;

use crate::judge::Evaluation;

/// Write one JSON object per line.
pub fn write_jsonl<T: Serialize>(writer: &mut impl Write, records: &[T]) -> anyhow::Result<()> {
    for record in records {
        serde_json::to_writer(&mut *writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CriterionTally {
    pub criterion: String,
    pub answer1: usize,
    pub answer2: usize,
    /// Winners the judge named in any other way.
    pub other: usize,
}

/// Wins per criterion across a batch of evaluations.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WinTally {
    pub total: usize,
    pub criteria: Vec<CriterionTally>,
}

impl WinTally {
    pub fn from_evaluations(evaluations: &[Evaluation]) -> Self {
        let mut tally = WinTally::default();

        for evaluation in evaluations {
            tally.total += 1;
            for (i, (criterion, verdict)) in evaluation.verdicts().into_iter().enumerate() {
                if tally.criteria.len() <= i {
                    tally.criteria.push(CriterionTally {
                        criterion: criterion.to_string(),
                        ..Default::default()
                    });
                }
                let entry = &mut tally.criteria[i];
                match normalize_winner(&verdict.winner) {
                    Some(1) => entry.answer1 += 1,
                    Some(2) => entry.answer2 += 1,
                    _ => entry.other += 1,
                }
            }
        }

        tally
    }

    pub fn overall(&self) -> Option<&CriterionTally> {
        self.criteria.iter().find(|c| c.criterion == "Overall Winner")
    }
}

fn normalize_winner(winner: &str) -> Option<u8> {
    match winner.trim().to_ascii_lowercase().as_str() {
        "answer 1" | "answer1" | "1" => Some(1),
        "answer 2" | "answer2" | "2" => Some(2),
        _ => None,
    }
}
