#![deny(clippy::all)]

use composer_sourcegen::{AstDocument, GenerateOptions, SourceGenerator};
use napi::{Error, Result, Status};
use napi_derive::napi;

fn invalid_arg(e: impl std::fmt::Display) -> Error {
    Error::new(Status::InvalidArg, e.to_string())
}

fn generate_failure(e: impl std::fmt::Display) -> Error {
    Error::new(Status::GenericFailure, e.to_string())
}

/// Generation result handed back to JavaScript.
#[napi(object)]
pub struct GeneratedOutput {
    pub source: String,
    /// Source map JSON, when one could be built.
    pub source_map: Option<String>,
}

#[napi]
pub struct Composer {
    generator: SourceGenerator,
}

#[napi]
impl Composer {
    /// `options_json` uses the same keys as `sourcegen.json`.
    #[napi(constructor)]
    pub fn new(options_json: Option<String>) -> Result<Self> {
        let options = match options_json {
            Some(json) => GenerateOptions::from_json(&json).map_err(invalid_arg)?,
            None => GenerateOptions::default(),
        };
        Ok(Composer {
            generator: SourceGenerator::new(options),
        })
    }

    #[napi]
    pub fn generate(&self, document_json: String) -> Result<String> {
        let ast = AstDocument::from_json(&document_json).map_err(invalid_arg)?;
        self.generator.generate(&ast).map_err(generate_failure)
    }

    #[napi]
    pub fn generate_with_source_map(
        &self,
        document_json: String,
        gen_file_path: String,
    ) -> Result<GeneratedOutput> {
        let ast = AstDocument::from_json(&document_json).map_err(invalid_arg)?;
        let generated = self
            .generator
            .generate_with_source_map(&ast, &gen_file_path)
            .map_err(generate_failure)?;
        let source_map = generated
            .source_map
            .map(|map| serde_json::to_string(&map))
            .transpose()
            .map_err(generate_failure)?;
        Ok(GeneratedOutput {
            source: generated.source,
            source_map,
        })
    }
}

/// One-shot generation with default options.
#[napi]
pub fn generate_source(document_json: String) -> Result<String> {
    let ast = AstDocument::from_json(&document_json).map_err(invalid_arg)?;
    SourceGenerator::default()
        .generate(&ast)
        .map_err(generate_failure)
}
