use std::fs::File;
use std::io::BufReader;

use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};

use jsonpin::{JsonLinter, SchemaLintError, line_number};

/// LSP server that re-lints a JSON document on every change and publishes
/// schema violations as diagnostics. The schema is loaded once at startup
/// from the first CLI argument; without one, every document validates
/// against the permissive empty schema.
struct Backend {
    client: Client,
    linter: JsonLinter,
}

impl Backend {
    async fn lint_and_publish(&self, uri: Url, text: &str) {
        let diagnostics = self
            .linter
            .lint(text)
            .into_iter()
            .map(|d| Diagnostic {
                range: Range {
                    start: line_number::position_of(text, d.start),
                    end: line_number::position_of(text, d.end),
                },
                severity: Some(DiagnosticSeverity::ERROR),
                message: d.message,
                source: Some(d.source),
                ..Default::default()
            })
            .collect();

        self.client.publish_diagnostics(uri, diagnostics, None).await;
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, _: InitializeParams) -> Result<InitializeResult> {
        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "jsonpin server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        self.lint_and_publish(params.text_document.uri, &params.text_document.text)
            .await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        // full sync: the last change carries the whole document
        if let Some(change) = params.content_changes.into_iter().last() {
            self.lint_and_publish(params.text_document.uri, &change.text)
                .await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.client
            .publish_diagnostics(params.text_document.uri, Vec::new(), None)
            .await;
    }
}

fn load_schema() -> std::result::Result<serde_json::Value, SchemaLintError> {
    match std::env::args().nth(1) {
        Some(path) => {
            let reader = BufReader::new(File::open(path)?);
            Ok(serde_json::from_reader(reader)?)
        }
        None => Ok(serde_json::json!({})),
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), SchemaLintError> {
    let schema = load_schema()?;
    let linter = JsonLinter::new(&schema)?;

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(|client| Backend { client, linter });
    Server::new(stdin, stdout, socket).serve(service).await;

    Ok(())
}
