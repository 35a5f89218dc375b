// Prompt constants for answer judgment and result insights.

pub const CODE_REVIEW_SYSTEM: &str = "You are an expert code reviewer assessing a job \
    candidate's solution fairly and consistently.";

/// Replace: {score_range_instruction}, {language}, {test_cases_json}, {question_text}, {code}
pub const CODE_REVIEW_PROMPT_TEMPLATE: &str = r#"Evaluate the following code submission.

Question: {question_text}

Language: {language}

Submitted Code:
{code}

Test Cases: {test_cases_json}

Score the code on:
1. correctness_score: does it solve the problem?
2. efficiency_score: time and space complexity
3. readability_score: naming, structure, clarity
4. edge_case_score: handling of empty, boundary and invalid input

{score_range_instruction}

Return a JSON object with this EXACT schema:
{
  "correctness_score": 85,
  "efficiency_score": 75,
  "readability_score": 90,
  "edge_case_score": 70,
  "is_correct": true,
  "strengths": ["Clear variable names"],
  "improvements": ["Missing check for empty input"],
  "detailed_feedback": "The solution correctly solves the problem..."
}"#;

pub const TEXT_REVIEW_SYSTEM: &str = "You are an expert HR interviewer assessing a job \
    candidate's written response.";

/// Replace: {score_range_instruction}, {skills}, {question_text}, {answer}
pub const TEXT_REVIEW_PROMPT_TEMPLATE: &str = r#"Evaluate this candidate's response.

Question: {question_text}
Skills being assessed: {skills}

Candidate's Answer:
{answer}

Score the answer on:
1. relevance_score: how well it answers the question
2. communication_score: clarity and structure
3. critical_thinking_score: depth of analysis
4. professionalism_score: tone and presentation

{score_range_instruction}

Return a JSON object with this EXACT schema:
{
  "relevance_score": 85,
  "communication_score": 90,
  "critical_thinking_score": 75,
  "professionalism_score": 95,
  "strengths": ["Clear communication"],
  "improvements": ["Could give a more specific example"],
  "detailed_feedback": "The candidate demonstrates..."
}"#;

pub const REASONING_SYSTEM: &str = "You are a recruitment analyst explaining a candidate's \
    assessment outcome to a recruiter.";

/// Replace: {percentage}, {skill_scores_json}, {total_candidates}, {job_title}, {candidate_name}
pub const REASONING_PROMPT_TEMPLATE: &str = r#"Explain this candidate's standing for the role.

Candidate: {candidate_name}
Position: {job_title}
Score: {percentage}/100
Skills Performance: {skill_scores_json}
Total Candidates: {total_candidates}

Provide:
1. An overall assessment (2-3 sentences)
2. Key ranking factors (what made them stand out or fall behind), each scored 0-100
3. A confidence score between 0 and 1 for this evaluation
4. A bias check
5. A success prediction for this role

Return a JSON object with this EXACT schema:
{
  "overall_assessment": "This candidate demonstrates...",
  "ranking_factors": [
    {"factor": "Technical Skills", "impact": "high", "score": 85, "explanation": "..."}
  ],
  "confidence_score": 0.85,
  "bias_check": {"detected": false, "notes": "No significant bias detected"},
  "prediction": "High likelihood of success..."
}"#;

pub const FEEDBACK_SYSTEM: &str = "You are a career coach giving constructive, encouraging \
    feedback to a job candidate.";

/// Replace: {percentage}, {skill_scores_json}, {question_feedback_json}, {job_title}, {candidate_name}
pub const FEEDBACK_PROMPT_TEMPLATE: &str = r#"Write a feedback report for this candidate.

Candidate: {candidate_name}
Position: {job_title}
Overall Score: {percentage}/100

Skill Performance:
{skill_scores_json}

Question-wise Feedback:
{question_feedback_json}

Include the top 3 strengths, the top 3 improvement areas (framed positively),
learning resources with real URLs, an improvement plan with a timeline,
an encouraging message and next steps.

Return a JSON object with this EXACT schema:
{
  "top_strengths": ["Strength 1", "Strength 2", "Strength 3"],
  "improvement_areas": ["Area 1", "Area 2", "Area 3"],
  "learning_resources": [
    {"title": "Course Name", "url": "https://example.com", "type": "course", "duration": "4 weeks"}
  ],
  "improvement_plan": "Over the next 2-3 weeks...",
  "estimated_improvement_time": "2-3 weeks",
  "positive_message": "You've shown great potential...",
  "next_steps": ["Step 1", "Step 2", "Step 3"]
}"#;
