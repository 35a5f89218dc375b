//! Skill aggregation: folds question evaluations into per-skill totals.

use std::collections::HashMap;

use crate::evaluation::scoring::percentage;
use crate::models::assessment::Question;
use crate::models::result::{QuestionEvaluation, SkillLevel, SkillScore};

#[derive(Debug, Default)]
struct SkillTotals {
    earned: f64,
    max: f64,
    count: u32,
}

/// One `SkillScore` per distinct tag seen on an evaluated question, in
/// first-seen order. A question contributes its full points to every tag it
/// carries. Tags on unanswered questions never appear.
pub fn aggregate_skills(
    evaluations: &[QuestionEvaluation],
    questions: &HashMap<&str, &Question>,
) -> Vec<SkillScore> {
    let mut order: Vec<&str> = Vec::new();
    let mut totals: HashMap<&str, SkillTotals> = HashMap::new();

    for evaluation in evaluations {
        let Some(question) = questions.get(evaluation.question_id.as_str()) else {
            continue;
        };
        for tag in &question.skill_tags {
            let entry = totals.entry(tag.as_str()).or_insert_with(|| {
                order.push(tag.as_str());
                SkillTotals::default()
            });
            entry.earned += evaluation.points_earned;
            entry.max += f64::from(question.points);
            entry.count += 1;
        }
    }

    order
        .into_iter()
        .filter_map(|tag| totals.remove(tag).map(|t| (tag, t)))
        .map(|(tag, t)| {
            let score = percentage(t.earned, t.max);
            SkillScore {
                skill_name: tag.to_string(),
                earned_points: t.earned,
                max_points: t.max,
                question_count: t.count,
                score,
                level: SkillLevel::from_percentage(score),
                feedback: format!("Scored {score}% in {tag}"),
            }
        })
        .collect()
}
