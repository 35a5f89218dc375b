//! Fixed substitutes for every external collaborator call.
//!
//! A collaborator that errors, returns a malformed document, or is still
//! pending at the job deadline resolves to one of these values. An unscored
//! answer or a missing narrative never blocks result composition.

use std::future::Future;

use tokio::time::{timeout_at, Instant};
use tracing::warn;

use crate::evaluation::judge::{CodeJudgment, TextJudgment};
use crate::llm_client::LlmError;
use crate::models::result::{
    AiReasoning, BiasCheck, FeedbackNarrative, LearningResource, RankingFactor,
};

/// Sub-score used for every dimension of a fallback judgment.
pub const FALLBACK_SUB_SCORE: f64 = 70.0;

pub fn code_judgment() -> CodeJudgment {
    CodeJudgment {
        correctness_score: FALLBACK_SUB_SCORE,
        efficiency_score: FALLBACK_SUB_SCORE,
        readability_score: FALLBACK_SUB_SCORE,
        edge_case_score: FALLBACK_SUB_SCORE,
        is_correct: true,
        strengths: vec!["Code submitted".to_string()],
        improvements: vec!["Could be optimized".to_string()],
        detailed_feedback: "Your solution shows understanding of the problem.".to_string(),
    }
}

pub fn text_judgment() -> TextJudgment {
    TextJudgment {
        relevance_score: FALLBACK_SUB_SCORE,
        communication_score: FALLBACK_SUB_SCORE,
        critical_thinking_score: FALLBACK_SUB_SCORE,
        professionalism_score: FALLBACK_SUB_SCORE,
        strengths: vec!["Clear response".to_string()],
        improvements: vec!["Could add more details".to_string()],
        detailed_feedback: "Your answer demonstrates understanding.".to_string(),
    }
}

pub fn reasoning() -> AiReasoning {
    AiReasoning {
        overall_assessment: "Candidate completed the assessment with reasonable performance."
            .to_string(),
        ranking_factors: vec![RankingFactor {
            factor: "Overall Performance".to_string(),
            impact: "high".to_string(),
            score: 70.0,
            explanation: "Solid attempt".to_string(),
        }],
        confidence_score: 0.7,
        bias_check: BiasCheck {
            detected: false,
            notes: "Standard evaluation".to_string(),
        },
        prediction: "Candidate shows potential for growth".to_string(),
    }
}

pub fn feedback() -> FeedbackNarrative {
    FeedbackNarrative {
        top_strengths: vec![
            "Completed assessment".to_string(),
            "Showed effort".to_string(),
            "Good attempt".to_string(),
        ],
        improvement_areas: vec![
            "Technical skills".to_string(),
            "Problem solving".to_string(),
            "Communication".to_string(),
        ],
        learning_resources: vec![LearningResource {
            title: "Online Courses".to_string(),
            url: "https://coursera.org".to_string(),
            kind: "course".to_string(),
            duration: "4 weeks".to_string(),
        }],
        improvement_plan: "Focus on strengthening core skills through practice and learning."
            .to_string(),
        estimated_improvement_time: "2-4 weeks".to_string(),
        positive_message: "You've shown potential. Keep learning and improving!".to_string(),
        next_steps: vec![
            "Practice coding problems".to_string(),
            "Take online courses".to_string(),
            "Apply again".to_string(),
        ],
    }
}

/// Awaits `call` until `deadline`. Returns the value and whether the
/// fallback was used.
pub async fn resolve<T, F>(
    what: &str,
    subject: &str,
    deadline: Instant,
    call: F,
    fallback: fn() -> T,
) -> (T, bool)
where
    F: Future<Output = Result<T, LlmError>>,
{
    match timeout_at(deadline, call).await {
        Ok(Ok(value)) => (value, false),
        Ok(Err(e)) => {
            warn!("{what} failed for {subject}, using fallback: {e}");
            (fallback(), true)
        }
        Err(_) => {
            warn!("{what} for {subject} hit the job deadline, using fallback");
            (fallback(), true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::Validate;
    use std::time::Duration;

    #[test]
    fn test_fallbacks_pass_their_own_validation() {
        assert!(code_judgment().validate().is_ok());
        assert!(text_judgment().validate().is_ok());
        assert!(reasoning().validate().is_ok());
        assert!(feedback().validate().is_ok());
    }

    #[tokio::test]
    async fn test_resolve_passes_through_success() {
        let deadline = Instant::now() + Duration::from_secs(5);
        let (value, fell_back) = resolve(
            "sample",
            "s1",
            deadline,
            async { Ok::<_, LlmError>(text_judgment()) },
            text_judgment,
        )
        .await;
        assert!(!fell_back);
        assert_eq!(value, text_judgment());
    }

    #[tokio::test]
    async fn test_resolve_substitutes_on_error() {
        let deadline = Instant::now() + Duration::from_secs(5);
        let (value, fell_back) = resolve(
            "sample",
            "s1",
            deadline,
            async { Err::<AiReasoning, _>(LlmError::EmptyContent) },
            reasoning,
        )
        .await;
        assert!(fell_back);
        assert_eq!(value.confidence_score, 0.7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_substitutes_when_deadline_passes() {
        let deadline = Instant::now() + Duration::from_secs(1);
        let slow = async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, LlmError>(CodeJudgment {
                correctness_score: 100.0,
                ..code_judgment()
            })
        };
        let (value, fell_back) = resolve("sample", "s1", deadline, slow, code_judgment).await;
        assert!(fell_back);
        assert_eq!(value.correctness_score, FALLBACK_SUB_SCORE);
    }
}
