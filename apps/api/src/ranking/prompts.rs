//! Prompt builders for the ranking pipeline.
//!
//! Both prompts request JSON-object output; the client additionally asks the
//! API for JSON response mode, so the instructions here are belt-and-braces.

/// Builds the structured-profile extraction prompt for one CV's text.
///
/// The contract with the model: one flat JSON object, meaningful key names,
/// and a dedicated `total_experience` field in years (int or float) that
/// sums declared work experience only — project durations excluded — with a
/// 0 default when no employment is listed.
pub fn profile_prompt(cv_text: &str) -> String {
    format!(
        r#"Please parse all data as much as possible from the document below as JSON. Use meaningful key names and return a single valid flat JSON object (one dictionary, no nesting of the top level).
Also give total experience in a dedicated "total_experience" field by combining all given work experiences, in int or float years, but do not add project durations into total experience.
If no experience or company name is given then return 0 years.

Extracted Text:
{cv_text}
"#
    )
}

/// Builds the rerank prompt for the top similarity survivors.
///
/// `cv_data_json` is a pretty-printed JSON array of
/// `{{"filename": ..., "json_data": ...}}` objects, one per survivor.
pub fn rerank_prompt(jd_text: &str, cv_data_json: &str) -> String {
    format!(
        r#"You are a hiring assistant. Below is a job description and the JSON data of the top CVs.
Your task is to analyze the CVs and rank them in order of best fit for the job description.
Only give the ranking as per the given format, do not give any additional information.

Job Description:
{jd_text}

CV Data:
{cv_data_json}

Return the result in the following JSON format:
{{
    "ranked_cvs": [
        {{
            "filename": "cv1.pdf",
            "ranking": "1"
        }},
        {{
            "filename": "cv2.pdf",
            "ranking": "2"
        }},
        ...
    ]
}}
"#
    )
}
