use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use composer_sourcegen::{AstDocument, SourceGenerator};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::SourcegenConfig;

pub const OUTPUT_EXTENSION: &str = "bal";

/// Where generated source goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Returned to the caller for printing, nothing is written.
    Stdout,
    /// Written into the directory, or next to each input when `None`.
    Files(Option<PathBuf>),
}

#[derive(Debug)]
pub struct GenerationResult {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub outcome: anyhow::Result<String>,
}

impl GenerationResult {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Expands glob patterns among `patterns`; plain paths are kept as given.
pub fn expand_inputs(patterns: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for pattern in patterns {
        if pattern.contains(['*', '?', '[']) {
            let mut matched = false;
            for entry in glob::glob(pattern).with_context(|| format!("invalid pattern {}", pattern))? {
                inputs.push(entry?);
                matched = true;
            }
            if !matched {
                anyhow::bail!("no input matches {}", pattern);
            }
        } else {
            inputs.push(PathBuf::from(pattern));
        }
    }
    Ok(inputs)
}

/// Path of the generated file for `input`.
pub fn output_path(input: &Path, out_dir: Option<&Path>) -> PathBuf {
    let file_name = input
        .file_stem()
        .map(|stem| format!("{}.{}", stem.to_string_lossy(), OUTPUT_EXTENSION))
        .unwrap_or_else(|| format!("out.{}", OUTPUT_EXTENSION));
    match out_dir.or_else(|| input.parent()) {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}

/// Generates every input in parallel. Results keep the order of `inputs`.
///
/// Inputs whose output paths coincide (same file stem in one out dir) all
/// fail without being generated, so no result overwrites another.
pub fn perform_generation(
    inputs: &[PathBuf],
    config: &SourcegenConfig,
    target: &OutputTarget,
) -> Vec<GenerationResult> {
    let generator = SourceGenerator::new(config.options.clone());
    info!(inputs = inputs.len(), "generating sources");

    let outputs: Vec<Option<PathBuf>> = inputs
        .iter()
        .map(|input| match target {
            OutputTarget::Stdout => None,
            OutputTarget::Files(dir) => Some(output_path(
                input,
                dir.as_deref().or(config.out_dir.as_deref()),
            )),
        })
        .collect();
    let claims = output_claims(inputs, &outputs);

    inputs
        .par_iter()
        .zip(outputs.par_iter())
        .map(|(input, output)| {
            let clash = output
                .as_deref()
                .and_then(|path| claims.get(path))
                .filter(|sources| sources.len() > 1);
            let outcome = match (clash, output.as_deref()) {
                (Some(sources), Some(path)) => Err(anyhow::anyhow!(
                    "output {} would be written by several inputs: {}",
                    path.display(),
                    sources
                        .iter()
                        .map(|source| source.display().to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                )),
                _ => generate_file(&generator, config, input, output.as_deref()),
            };
            GenerationResult {
                input: input.clone(),
                output: output.clone(),
                outcome,
            }
        })
        .collect()
}

/// Inputs that would write each output path, in input order.
fn output_claims<'a>(
    inputs: &'a [PathBuf],
    outputs: &'a [Option<PathBuf>],
) -> HashMap<&'a Path, Vec<&'a Path>> {
    let mut claims: HashMap<&Path, Vec<&Path>> = HashMap::new();
    for (input, output) in inputs.iter().zip(outputs) {
        if let Some(output) = output {
            claims.entry(output.as_path()).or_default().push(input.as_path());
        }
    }
    claims
}

fn generate_file(
    generator: &SourceGenerator,
    config: &SourcegenConfig,
    input: &Path,
    output: Option<&Path>,
) -> anyhow::Result<String> {
    let ast = AstDocument::load(input)?;
    debug!(input = %input.display(), nodes = ast.len(), "loaded document");

    let Some(output) = output else {
        return Ok(generator.generate(&ast)?);
    };

    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    }

    let mut source;
    if config.source_map {
        let map_path = PathBuf::from(format!("{}.map", output.display()));
        let gen_file = output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let generated = generator.generate_with_source_map(&ast, &gen_file)?;
        source = generated.source;
        if let Some(map) = generated.source_map {
            if config.source_map_comment {
                source.push('\n');
                source.push_str(&map.to_comment());
            }
            fs::write(&map_path, serde_json::to_string(&map)?)
                .with_context(|| format!("failed to write {}", map_path.display()))?;
        }
    } else {
        source = generator.generate(&ast)?;
    }

    let mut contents = source.clone();
    contents.push('\n');
    fs::write(output, contents).with_context(|| format!("failed to write {}", output.display()))?;
    info!(output = %output.display(), "wrote source");
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_place_output_next_to_input() {
        assert_eq!(
            output_path(Path::new("models/hello.json"), None),
            PathBuf::from("models/hello.bal")
        );
        assert_eq!(
            output_path(Path::new("models/hello.json"), Some(Path::new("gen"))),
            PathBuf::from("gen/hello.bal")
        );
    }

    #[test]
    fn should_collect_inputs_sharing_an_output() {
        let inputs = vec![
            PathBuf::from("a/x.json"),
            PathBuf::from("b/x.json"),
            PathBuf::from("a/y.json"),
        ];
        let outputs: Vec<Option<PathBuf>> = inputs
            .iter()
            .map(|input| Some(output_path(input, Some(Path::new("gen")))))
            .collect();

        let claims = output_claims(&inputs, &outputs);
        assert_eq!(
            claims[Path::new("gen/x.bal")],
            vec![Path::new("a/x.json"), Path::new("b/x.json")]
        );
        assert_eq!(claims[Path::new("gen/y.bal")], vec![Path::new("a/y.json")]);
    }

    #[test]
    fn should_keep_plain_paths() {
        let inputs = expand_inputs(&["a.json".to_string(), "b.json".to_string()]).unwrap();
        assert_eq!(inputs, vec![PathBuf::from("a.json"), PathBuf::from("b.json")]);
    }
}
