//! Prompt construction for each pipeline stage.
//!
//! Every prompt pins the model to a strict JSON output contract; the
//! stage runner validates the response against the matching type.

use tpost_models::{
    BlogContentType, BlogLength, BlogTone, GenerationRequest, SearchEnrichment, SearchTermSet,
};

/// Input payload for the composition stage.
#[derive(Debug, Clone)]
pub struct ComposeInput {
    pub summary: String,
    pub terms: SearchTermSet,
    pub enrichment: SearchEnrichment,
    pub length: BlogLength,
    pub tone: BlogTone,
    pub content_type: BlogContentType,
}

/// Prompt for the transcript-summarization stage.
///
/// The video itself rides along as a media attachment; the prompt only
/// carries the style constraints and the output contract.
pub fn summarize_prompt(request: &GenerationRequest) -> String {
    let mut prompt = format!(
        r#"You are a skilled content writer turning a video into the base draft of a blog post.

Watch the attached video and write a complete, natural-sounding blog draft from its content.

Blog type: "{content_type}"
Tone: "{tone}"
Length: "{length}" ({budget})

Rules:
- Integrate the video's key points naturally; do not list or rephrase them mechanically.
- Never mention "the video", "the YouTuber", or that this came from a video.
- Open with a hook, develop a logical flow, and close with a takeaway.
- Meet the target length; expand with examples or context rather than padding.

Return ONLY a JSON object with this exact shape:
{{"summary": "<the full blog draft>"}}"#,
        content_type = request.content_type,
        tone = request.tone,
        length = request.length,
        budget = request.length.word_budget(),
    );

    if let Some(extra) = request.additional_prompt.as_deref() {
        if !extra.trim().is_empty() {
            prompt.push_str("\n\nADDITIONAL USER INSTRUCTIONS:\n");
            prompt.push_str(extra.trim());
        }
    }

    prompt
}

/// Prompt for the search-term extraction stage.
pub fn search_terms_prompt(summary: &str) -> String {
    format!(
        r#"Extract exactly three search terms from the draft below, to gather web context that will enrich it:

1. The core topic, phrased to find its definition or basics.
2. A practical process or technique from the draft, phrased to find examples or tutorials.
3. A concept whose importance or benefits would add value, phrased to find why it matters.

Rules:
- All three terms must stay strictly within the draft's scope.
- Short, search-ready phrases only; no sentences, no generic terms.

Return ONLY a JSON object with this exact shape:
{{"searchTerms": ["term1", "term2", "term3"]}}

Draft:
{summary}"#
    )
}

/// Prompt for the composition stage.
///
/// Takes the base draft plus the positional enrichment results and
/// produces the final titled post.
pub fn compose_prompt(input: &ComposeInput) -> String {
    let terms = input
        .terms
        .search_terms
        .iter()
        .map(|t| format!("\"{}\"", t))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"You are a senior blog editor. Below is a well-written base draft and curated web research for three related terms. Revise and enrich the draft into a final publishable post.

Rules:
- Keep the draft's structure, tone ("{tone}") and content type ("{content_type}"); enrich, do not rewrite.
- Weave in research facts only where they genuinely support the surrounding text.
- Target length: {budget}. Expand thin sections with insight from the research; no fluff.
- Give the post a strong title.
- Never mention "search results", "terms", "research", or "the video".

Base draft:
{summary}

Research terms: [{terms}]

Research results:
1. {r1}
2. {r2}
3. {r3}

Return ONLY a JSON object with this exact shape:
{{"title": "<post title>", "content": "<final post body>"}}"#,
        tone = input.tone,
        content_type = input.content_type,
        budget = input.length.word_budget(),
        summary = input.summary,
        terms = terms,
        r1 = input.enrichment.term1,
        r2 = input.enrichment.term2,
        r3 = input.enrichment.term3,
    )
}

/// Prompt for the image-generation branch.
pub fn image_prompt(summary: &str) -> String {
    format!(
        r#"Generate a header illustration for a blog post. The image sits at the top of the post and should capture its central theme and emotional tone.

Post content:
{summary}

Visual guidance:
- Clean, aesthetic, mobile-friendly; suitable as a wide blog banner (1200x600).
- Use symbols or metaphors relevant to the topic rather than literal scenes.
- No text in the image."#
    )
}
