// Prompt templates for the polish flow.
// Placeholders (`{resume_text}`, `{jd_text}`, `{tech_stack}`) are replaced
// before sending. The chat endpoint receives a single user message, so the
// output contract is appended to the task text rather than sent as a system
// prompt.

/// Shared opening for every scenario.
pub const ROLE_INSTRUCTION: &str = "You are an experienced resume writer who writes concise, \
    ATS-friendly resumes in the single-column style of Jake's resume template. \
    Do not add emojis, icons, or any commentary before or after the resume.";

pub const OPTIMIZE_FOR_JD_TASK: &str = "Rewrite the resume below so it targets the job \
    description. Keep every fact truthful to the original resume; emphasise the skills and \
    results the job description asks for.

Job Description:
{jd_text}

Resume:
{resume_text}";

pub const OPTIMIZE_TASK: &str = "Improve the resume below: tighten wording, lead bullets with \
    strong verbs, and quantify results where the original gives numbers.

Resume:
{resume_text}";

pub const FROM_TECH_STACK_TASK: &str = "The user has no resume yet. Draft one for a software \
    engineer who works with the tech stack below. Use realistic placeholder values for personal \
    details the user has not given.

Tech stack:
{tech_stack}";

/// Output contract for the structured (JSON) mode.
pub const STRUCTURED_OUTPUT: &str = r#"Respond with one JSON object and nothing else, using exactly these keys (omit a key rather than leaving it empty):
{
  "name": "",
  "contact": {"email": "", "phone": "", "linkedin": "", "address": "", "portfolio": ""},
  "summary": "",
  "skills": {"languages": [], "frameworks": [], "databases": [], "tools": [], "concepts": []},
  "experience": [{"title": "", "company": "", "dates": "", "description": [""]}],
  "education": [{"degree": "", "university": "", "graduationDate": ""}],
  "projects": [{"name": "", "description": ""}],
  "achievements": [""],
  "hobbies": [""],
  "languages": [""]
}
"languages" at the top level means spoken languages; programming languages go under skills."#;

/// Output contract for the legacy free-text mode.
pub const FREE_TEXT_OUTPUT: &str = "Respond with the resume as plain text only. Put the name \
    on the first line and contact details on the following lines. Separate sections with one \
    blank line, write each section heading in ALL CAPS on its own line, and start every bullet \
    with \"- \". Mark emphasis with **double asterisks**.";
