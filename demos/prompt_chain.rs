//! Fill a prompt template and send it to a Hugging Face hosted model.
//!
//! Needs HUGGINGFACEHUB_API_TOKEN, read from `.env` when present.

use tool_agent::config::Secrets;
use tool_agent::llm::{
    huggingface::{HuggingFaceEndpoint, DEFAULT_REPO_ID},
    prompt::PromptTemplate,
    traits::LLM,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let secrets = Secrets::from_env_file(".env")?;
    let mut llm = HuggingFaceEndpoint::new(DEFAULT_REPO_ID)
        .with_max_new_tokens(128)
        .with_temperature(0.5);
    if let Some(token) = secrets.huggingface_token() {
        llm = llm.with_token(token);
    }

    let prompt = PromptTemplate::from_template("Question: {question} Answer: Let's think step by step.")?;
    let text = prompt.format_with(&[("question", "Who won the FIFA World Cup in the year 1994?")])?;

    let answer = llm.invoke(&text).await?;
    println!("{}", answer.trim());
    Ok(())
}
