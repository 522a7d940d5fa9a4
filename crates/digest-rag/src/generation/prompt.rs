//! Prompt templates for summarization and RAG generation

use crate::types::SearchResult;

/// Instruction for every chunk and reduce summary
pub const SUMMARY_SYSTEM: &str = "You are a helpful assistant. Your task is to summarize the provided text concisely, \
retaining all key information, facts and conclusions.";

/// Instruction sent with each embedded image
pub const IMAGE_DESCRIPTION: &str =
    "Describe this image in detail, focusing on its content and any text visible in it.";

/// Label for the image block appended to the reduce input
pub const IMAGE_NOTES_LABEL: &str = "Image Interpretations:";

/// Instruction for video transcript summaries
pub const YOUTUBE_SYSTEM: &str = r#"You will be provided with a YouTube video transcript. Your task is to create a concise, informative summary that captures the key points, main ideas, and essential information. Follow these guidelines:

- Identify the video's main topic and overall purpose.
- Extract 3-5 key points or main ideas discussed in the video.
- Highlight any important facts, statistics, or examples that support the main ideas.
- Note any significant conclusions or takeaways.
- Mention any notable guests, experts, or sources cited in the video.
- Include timestamps for crucial moments or sections, if available.
- Summarize in a clear, objective manner without personal opinions or bias.
- Use bullet points or short paragraphs for easy readability.
- Maintain the original tone and style of the video (e.g., formal, casual, educational).

Adjust the summary length based on the video duration:
- For videos < 10 minutes: 100-150 words
- For videos 10-30 minutes: 150-300 words
- For videos 30-60 minutes: 300-500 words
- For videos > 60 minutes: 500-800 words
These are guidelines, not strict rules. Adjust the length as needed to capture all essential information while maintaining conciseness. If the video content is particularly dense or complex, you may need to exceed these ranges slightly."#;

/// Instruction for context-grounded answers
pub const RAG_SYSTEM: &str = r#"You are a helpful assistant. Answer the question based on the provided context.
Always prioritize the provided context in your answers.
If the provided context doesn't cover a topic, rely on your general knowledge but clearly state when you are doing so.
Admit if you are unsure about something and suggest where to find more information."#;

/// Prompt builder for summaries and RAG queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Join retrieved fragment texts into one context block
    pub fn build_context(results: &[SearchResult]) -> String {
        results
            .iter()
            .map(|result| result.fragment.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// User turn for a RAG question
    pub fn build_rag_user_turn(question: &str, context: &str) -> String {
        format!("Context: {}\n\nQuestion: {}", context, question)
    }

    /// Input for the reduce call: chunk summaries, then any image notes
    pub fn build_reduce_input(summaries: &[String], image_notes: &[String]) -> String {
        let mut input = summaries.join("\n\n");

        if !image_notes.is_empty() {
            if !input.is_empty() {
                input.push_str("\n\n");
            }
            input.push_str(IMAGE_NOTES_LABEL);
            input.push('\n');
            input.push_str(&image_notes.join("\n\n"));
        }

        input
    }
}
