//! Prompt templates for document mode and RAG mode

use crate::types::RetrievalResult;

/// Separator between chunks in a RAG context block
pub const CHUNK_SEPARATOR: &str = "\n\n---\n\n";

/// Prompt builder for analysis, document-mode and RAG prompts
pub struct PromptBuilder;

impl PromptBuilder {
    /// Summary request sent once per upload
    pub fn analysis_prompt(content: &str) -> String {
        format!(
            r#"Please read and analyze this document. Provide a comprehensive summary including:
1. Main topics covered
2. Key points and insights
3. Important details
4. Overall structure and organization

Document content:
{content}"#,
            content = content
        )
    }

    /// Whole-document prompt: answer `question` from `content`, or explain
    /// the document when there is no question
    pub fn document_prompt(content: &str, question: Option<&str>) -> String {
        match question {
            Some(question) => format!(
                r#"Based on this document, please answer the following question: "{question}"

Document content:
{content}

Please provide a clear, concise answer based on the information in the document."#,
                question = question,
                content = content
            ),
            None => format!(
                r#"Please provide a detailed explanation of this document. Make it conversational and easy to understand, as if you're explaining it to someone who hasn't read it yet.

Document content:
{content}"#,
                content = content
            ),
        }
    }

    /// Label retrieved chunks as `[Chunk i]` (1-based) and join them with a separator
    pub fn build_context(results: &[RetrievalResult]) -> String {
        results
            .iter()
            .enumerate()
            .map(|(i, result)| format!("[Chunk {}]\n{}", i + 1, result.text))
            .collect::<Vec<_>>()
            .join(CHUNK_SEPARATOR)
    }

    /// Grounded prompt answering `question` from retrieved chunks
    pub fn rag_prompt(question: &str, results: &[RetrievalResult]) -> String {
        Self::rag_template(
            &Self::build_context(results),
            &format!("Question: {}", question),
        )
    }

    /// Grounded prompt explaining retrieved chunks when no question was asked
    pub fn rag_explain_prompt(results: &[RetrievalResult]) -> String {
        Self::rag_template(
            &Self::build_context(results),
            "Task: Provide a detailed explanation of the document excerpts above. \
             Make it conversational and easy to understand, as if you're explaining it to someone who hasn't read it yet.",
        )
    }

    fn rag_template(context: &str, request: &str) -> String {
        format!(
            r#"You are answering based on excerpts retrieved from the user's uploaded documents.

Context:
{context}

{request}

Instructions:
- Answer using ONLY the information in the context above.
- If the context does not contain enough information to answer, say so explicitly instead of guessing.
- Keep the answer conversational and easy to understand."#,
            context = context,
            request = request
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(text: &str, index: u32, score: f32) -> RetrievalResult {
        RetrievalResult {
            id: format!("doc.txt_chunk_{}", index),
            text: text.to_string(),
            file_name: "doc.txt".to_string(),
            chunk_index: index,
            score,
        }
    }

    #[test]
    fn test_build_context() {
        let context = PromptBuilder::build_context(&[
            result("Water is wet.", 1, 0.9),
            result("Fire is hot.", 2, 0.7),
        ]);
        assert_eq!(context, "[Chunk 1]\nWater is wet.\n\n---\n\n[Chunk 2]\nFire is hot.");
        assert_eq!(PromptBuilder::build_context(&[]), "");
    }

    #[test]
    fn test_document_prompt_modes() {
        let with_question = PromptBuilder::document_prompt("Body text.", Some("What is it?"));
        assert!(with_question.contains("answer the following question: \"What is it?\""));
        assert!(with_question.contains("Document content:\nBody text."));
        assert!(with_question.ends_with("information in the document."));

        let explain = PromptBuilder::document_prompt("Body text.", None);
        assert!(explain.starts_with("Please provide a detailed explanation of this document."));
        assert!(explain.ends_with("Document content:\nBody text."));
    }

    #[test]
    fn test_rag_prompt_order_and_rules() {
        let prompt = PromptBuilder::rag_prompt("Is water wet?", &[result("Water is wet.", 0, 0.95)]);

        let context_at = prompt.find("[Chunk 1]\nWater is wet.").unwrap();
        let question_at = prompt.find("Question: Is water wet?").unwrap();
        let rules_at = prompt.find("ONLY the information in the context").unwrap();
        assert!(context_at < question_at && question_at < rules_at);
        assert!(prompt.contains("say so explicitly"));
        assert!(prompt.contains("conversational"));
    }

    #[test]
    fn test_rag_explain_prompt() {
        let prompt = PromptBuilder::rag_explain_prompt(&[result("Fire is hot.", 0, 0.5)]);
        assert!(prompt.contains("[Chunk 1]\nFire is hot."));
        assert!(prompt.contains("Task: Provide a detailed explanation"));
        assert!(!prompt.contains("Question:"));
    }

    #[test]
    fn test_analysis_prompt() {
        let prompt = PromptBuilder::analysis_prompt("# Notes");
        assert!(prompt.contains("1. Main topics covered"));
        assert!(prompt.contains("4. Overall structure and organization"));
        assert!(prompt.ends_with("Document content:\n# Notes"));
    }
}
