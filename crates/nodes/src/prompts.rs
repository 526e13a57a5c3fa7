//! Prompt templates sent to the generator.

use pipeline::ResearchData;

pub fn planning(topic: &str, tone: &str) -> String {
    format!(
        "You are an AI blog strategist. Break down this topic into major subtopics for a full-length blog:

Topic: {topic}
Tone: {tone}

Respond with:
Subtopic1|Subtopic2|Subtopic3|...
Recommended depth: [basic|intermediate|advanced]
"
    )
}

pub fn writing(topic: &str, subtopics: &[String], research_notes: &str, tone: &str) -> String {
    format!(
        "Write a full-length blog post about the topic below.

Topic: {topic}
Subtopics: {subtopics}
Research notes: {research_notes}
Tone: {tone}

Format using Markdown:
- Use H2 for subtopic headings
- Use bullet points, bold text, and examples
- Avoid including any images
- Keep it informative and flowing logically
",
        subtopics = subtopics.join(", "),
    )
}

pub fn seo(draft: &str, research: &ResearchData) -> String {
    format!(
        "Generate JSON SEO metadata for this blog:
{draft}

Keywords to include: {keywords}
Return JSON with keys: title, meta_description, keywords, reading_time, slug
",
        keywords = research.keywords.join(", "),
    )
}
