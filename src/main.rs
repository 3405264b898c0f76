use anyhow::Context;
use docent::chat::{ChatEngine, ChatEngineConfig};
use docent::chunk::{FilterConfig, SentenceChunker};
use docent::cli::{Cli, Commands, Output};
use docent::config::Config;
use docent::embed::Embedder;
use docent::ingest::loader::TextLoader;
use docent::ingest::IngestionPipeline;
use docent::lang::{LibreTranslateClient, Translator, WhatlangDetector};
use docent::retrieve::Retriever;
use docent::session::SessionStore;
use docent::store::file::FileVectorStore;
use docent::store::VectorStore;
use std::io::BufRead;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();

    let default_filter = if cli.verbose { "docent=debug" } else { "docent=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let output = Output::new(!cli.no_color);
    let config = Config::from_env().context("failed to load configuration")?;

    let embedder = build_embedder(&config)?;
    let store: Arc<dyn VectorStore> = Arc::new(
        FileVectorStore::open(
            &config.store.data_dir,
            &config.store.collection,
            embedder.model_name(),
        )
        .await
        .context("failed to open vector store")?,
    );

    match cli.command {
        Commands::Ingest { directory } => {
            let pipeline = IngestionPipeline::new(
                Arc::new(TextLoader::new()),
                embedder,
                store,
                SentenceChunker::new(config.chunking.max_chars),
                FilterConfig::default(),
            );

            let report = pipeline
                .ingest(&directory)
                .await
                .with_context(|| format!("ingestion of {} failed", directory.display()))?;

            output.success(&format!(
                "ingested {} file(s), {} fragment(s) indexed",
                report.ingested_files, report.fragments_indexed
            ));
            if report.skipped_files > 0 {
                output.info(&format!(
                    "{} file(s) already indexed, skipped",
                    report.skipped_files
                ));
            }
            if report.failed_files > 0 {
                output.warning(&format!(
                    "{} file(s) failed to process, see log for details",
                    report.failed_files
                ));
            }
        }

        Commands::Chat { session } => {
            let engine = build_engine(&config, embedder, store)?;
            run_chat(&engine, &session, &output).await?;
        }

        Commands::Sources => {
            let sources = store.list_sources().await?;
            if sources.is_empty() {
                output.info("the index is empty, run `docent ingest <dir>` first");
            } else {
                for source in &sources {
                    println!("{}", source);
                }
                output.info(&format!("{} source(s) indexed", sources.len()));
            }
        }
    }

    Ok(())
}

fn build_embedder(config: &Config) -> anyhow::Result<Arc<dyn Embedder>> {
    #[cfg(feature = "ollama")]
    {
        Ok(Arc::new(docent::embed::OllamaEmbedder::new(
            &config.embedding.ollama_url,
            config.embedding.model.clone(),
        )))
    }
    #[cfg(not(feature = "ollama"))]
    {
        let _ = config;
        anyhow::bail!("built without the `ollama` feature; no embedding backend available");
    }
}

fn build_engine(
    config: &Config,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
) -> anyhow::Result<ChatEngine> {
    #[cfg(not(feature = "ollama"))]
    {
        let _ = (config, embedder, store);
        anyhow::bail!("built without the `ollama` feature; no chat backend available");
    }
    #[cfg(feature = "ollama")]
    {
        let chat_model: Arc<dyn docent::llm::ChatModel> = Arc::new(docent::llm::OllamaChat::new(
            &config.llm.ollama_url,
            config.llm.model.clone(),
        ));

        let translator: Option<Arc<dyn Translator>> = config
            .language
            .translate_url
            .as_ref()
            .map(|url| Arc::new(LibreTranslateClient::new(url, None)) as Arc<dyn Translator>);

        Ok(ChatEngine::new(
            Retriever::new(embedder, store),
            chat_model,
            Arc::new(WhatlangDetector::new()),
            translator,
            Arc::new(SessionStore::new()),
            ChatEngineConfig {
                index_language: config.language.index_language.clone(),
                retrieval_k: config.retrieval.k,
                no_context_reply: config.llm.no_context_reply.clone(),
            },
        ))
    }
}

async fn run_chat(engine: &ChatEngine, session: &str, output: &Output) -> anyhow::Result<()> {
    output.info(&format!(
        "chatting in session '{}'; type 'exit' or press Ctrl-D to quit",
        session
    ));

    let stdin = std::io::stdin();
    loop {
        output.prompt();
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            break;
        }

        match engine.answer(session, question).await {
            Ok(reply) => output.reply(&reply),
            Err(e) => output.error(&format!("failed to answer: {}", e)),
        }
    }

    Ok(())
}
