//! Prompt builder for the rubric-scoring pipeline.

/// Fixed four-factor rubric. The formula is spelled out step by step so the
/// model's arithmetic stays repeatable across calls; the score is still
/// clamped on our side afterwards.
pub const RUBRIC_PROMPT_TEMPLATE: &str = r#"
You are an expert JD Reviewer & Evaluator. Your job is to analyze multiple job descriptions (JDs) against a given CV and generate a precise, data-driven matching score.

## **Task Instructions**
- Analyze the provided CV against the given JD.
- Use a **fixed step-by-step calculation process** to ensure repeatability.
- Ensure exact decimal precision (e.g., 87.56%) - no estimations or rounding.
- Return JSON output with only the match score.

## **Scoring Methodology (Strict Formula)**

Follow this step-by-step method to compute the score:

# **Skill Match**
    - Count how many required skills exist in the CV.
    - Compute: (Matched Skills / Total Required Skills)

# **Experience Match (0-100 scale)**
    - Compute: (Min(CV experience, JD experience) / JD experience) * 100

# **Education Match**

# **Industry & Role Relevance**

# **Final Score Calculation**
   - Compute the **Final Score** as the **average of the four components**:
     Match_score = (skill_match + experience_match + education_match + industry_match) / 4
   - Ensure strict **decimal precision** (e.g., `87.56`).

---

## **Expected Output (No Additional Text)**
{
"Match_score": <Score in decimal format>
}
"#;

/// Appends the normalized CV and JD texts to the rubric template.
pub fn rubric_prompt(cv_text: &str, jd_text: &str) -> String {
    format!("{RUBRIC_PROMPT_TEMPLATE}\nCV:\n{cv_text}\nJD:\n{jd_text}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rubric_prompt_orders_cv_before_jd() {
        let prompt = rubric_prompt("CV TEXT HERE", "JD TEXT HERE");
        let cv_pos = prompt.find("CV TEXT HERE").unwrap();
        let jd_pos = prompt.find("JD TEXT HERE").unwrap();
        assert!(cv_pos < jd_pos);
        assert!(prompt.contains("Match_score"));
    }
}
