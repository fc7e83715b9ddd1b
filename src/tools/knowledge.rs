use super::tool::Capability;
use crate::knowledge::KnowledgeRetriever;
use crate::Result;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

/// Arguments for the `tourism_knowledge` tool
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct KnowledgeArgs {
    /// The question to answer, phrased in full
    pub question: String,
}

#[derive(Debug, Clone)]
pub struct KnowledgeTool {
    retriever: KnowledgeRetriever,
}

impl KnowledgeTool {
    pub fn new(retriever: KnowledgeRetriever) -> Self {
        Self { retriever }
    }
}

#[async_trait]
impl Capability for KnowledgeTool {
    type Args = KnowledgeArgs;

    const NAME: &'static str = "tourism_knowledge";
    const DESCRIPTION: &'static str = "Answer general tourism questions (attractions, customs, safety, emergency numbers, \
         local tips) and questions about the company's privacy policy, using the document library.";

    async fn invoke(&self, args: KnowledgeArgs) -> Result<Value> {
        let answer = self.retriever.answer(&args.question).await?;
        Ok(json!({ "answer": answer }))
    }
}
