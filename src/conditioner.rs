//! Batch conversion driver.
//!
//! A [Conditioner] accumulates source files (directly or by scanning a
//! directory with a wildcard pattern), then converts the whole batch: every
//! file and its transitive includes are scanned and parsed into one shared
//! parse tree, the tree is resolved, each resolved object is compiled
//! through the caller's [ShaderCompiler] and encoded, and each finished
//! binary is handed to the caller's write callback. A failing object is
//! reported and skipped; it never aborts the batch.

use psl_ast::ParseTree;
use psl_formats::ShaderStage;
use psl_ir::{
    CompileRequest, ComputeArtifacts, ConfigurationArtifacts, GraphicsArtifacts, PassArtifacts,
    ResolvedComputeSet, ResolvedPass, ResolvedPipelineSet, ShaderCompiler,
};
use psl_output::{output_compute_set, output_pipeline_set, PipelineOutput};
use psl_text::{LogEvent, LogSource, Logger, Severity};
use std::cell::Cell;
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

/// Resolves an `include` path against the file that named it
pub type PathResolver<'a> = &'a dyn Fn(&Path, &Path) -> Option<PathBuf>;

/// Match a file name against a pattern where `*` matches any run of
/// characters and `?` matches exactly one
pub fn wildcard_match(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();

    let mut p = 0;
    let mut n = 0;
    let mut star = None;
    let mut star_n = 0;

    while n < name.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == name[n]) {
            p += 1;
            n += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            star = Some(p);
            star_n = n;
            p += 1;
        } else if let Some(star_p) = star {
            // Let the last star swallow one more character
            p = star_p + 1;
            star_n += 1;
            n = star_n;
        } else {
            return false;
        }
    }

    while p < pattern.len() && pattern[p] == '*' {
        p += 1;
    }
    p == pattern.len()
}

/// Logger wrapper that remembers whether anything at Error severity or
/// above passed through
struct ErrorTracking<'l> {
    inner: &'l dyn Logger,
    saw_error: Cell<bool>,
}

impl Logger for ErrorTracking<'_> {
    fn log(&self, event: LogEvent) {
        if event.severity >= Severity::Error {
            self.saw_error.set(true);
        }
        self.inner.log(event);
    }
}

/// Batch converter driving the full scan, parse, resolve, compile and
/// encode pipeline over a set of source files
pub struct Conditioner<'a> {
    logger: &'a dyn Logger,
    compiler: &'a dyn ShaderCompiler,
    resolver: Option<PathResolver<'a>>,
    unprocessed: BTreeSet<PathBuf>,
}

impl<'a> Conditioner<'a> {
    pub fn new(logger: &'a dyn Logger, compiler: &'a dyn ShaderCompiler) -> Conditioner<'a> {
        Conditioner {
            logger,
            compiler,
            resolver: None,
            unprocessed: BTreeSet::new(),
        }
    }

    /// Override how `include` paths are resolved. The default resolves them
    /// against the directory of the including file.
    pub fn with_path_resolver(mut self, resolver: PathResolver<'a>) -> Conditioner<'a> {
        self.resolver = Some(resolver);
        self
    }

    /// Queue one source file for conversion
    pub fn add_file(&mut self, path: impl Into<PathBuf>) {
        self.unprocessed.insert(path.into());
    }

    /// Queue every file in a directory whose name matches a wildcard
    /// pattern such as `*.pset`
    pub fn add_directory(&mut self, directory: &Path, pattern: &str) -> io::Result<()> {
        for entry in std::fs::read_dir(directory)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            if let Some(name) = name.to_str() {
                if wildcard_match(pattern, name) {
                    self.unprocessed.insert(entry.path());
                }
            }
        }
        Ok(())
    }

    /// Convert the queued batch, handing each finished binary to `write`.
    /// Returns false if any object was skipped or any diagnostic of Error
    /// severity or above was reported.
    pub fn convert(
        &mut self,
        write: &mut dyn FnMut(PipelineOutput) -> io::Result<()>,
    ) -> bool {
        let tracking = ErrorTracking {
            inner: self.logger,
            saw_error: Cell::new(false),
        };

        let mut tree = ParseTree::default();
        let mut processed: BTreeSet<PathBuf> = BTreeSet::new();

        while let Some(path) = self.unprocessed.pop_first() {
            if !processed.insert(path.clone()) {
                continue;
            }
            log::debug!("converting {}", path.display());

            let source = match std::fs::read_to_string(&path) {
                Ok(source) => source,
                Err(err) => {
                    let message = format!("Failed to read file: {err}");
                    tracking.log(LogEvent::file(
                        Severity::Error,
                        LogSource::General,
                        &message,
                        &path,
                    ));
                    continue;
                }
            };

            let tokens = psl_lexer::scan(&source, &path, &tracking);

            let mut includes = BTreeSet::new();
            psl_parser::parse(&tokens, &path, &tracking, &mut tree, &mut includes);

            for include in includes {
                match self.resolve_include(&path, &include) {
                    Some(resolved) => {
                        if !processed.contains(&resolved) {
                            self.unprocessed.insert(resolved);
                        }
                    }
                    None => {
                        let message = format!("Cannot resolve include '{}'", include.display());
                        tracking.log(LogEvent::file(
                            Severity::Error,
                            LogSource::General,
                            &message,
                            &path,
                        ));
                    }
                }
            }
        }

        let resolved = psl_resolver::resolve(&tree, &tracking);

        for set in &resolved.pipeline_sets {
            let artifacts = match self.compile_pipeline_set(set) {
                Ok(artifacts) => artifacts,
                Err(message) => {
                    tracking.log(LogEvent::file(
                        Severity::Error,
                        LogSource::Output,
                        &message,
                        &set.source_path,
                    ));
                    continue;
                }
            };
            match output_pipeline_set(set, &artifacts) {
                Ok(output) => Self::write_output(&tracking, &set.source_path, output, write),
                Err(err) => {
                    let message = err.to_string();
                    tracking.log(LogEvent::file(
                        Severity::Error,
                        LogSource::Output,
                        &message,
                        &set.source_path,
                    ));
                }
            }
        }

        for compute in &resolved.compute_sets {
            let artifacts = match self.compile_compute_set(compute) {
                Ok(artifacts) => artifacts,
                Err(message) => {
                    tracking.log(LogEvent::file(
                        Severity::Error,
                        LogSource::Output,
                        &message,
                        &compute.source_path,
                    ));
                    continue;
                }
            };
            match output_compute_set(compute, &artifacts) {
                Ok(output) => Self::write_output(&tracking, &compute.source_path, output, write),
                Err(err) => {
                    let message = err.to_string();
                    tracking.log(LogEvent::file(
                        Severity::Error,
                        LogSource::Output,
                        &message,
                        &compute.source_path,
                    ));
                }
            }
        }

        !tracking.saw_error.get()
    }

    fn resolve_include(&self, from: &Path, include: &Path) -> Option<PathBuf> {
        match self.resolver {
            Some(resolver) => resolver(from, include),
            None => Some(match from.parent() {
                Some(parent) => parent.join(include),
                None => include.to_path_buf(),
            }),
        }
    }

    fn write_output(
        tracking: &ErrorTracking,
        path: &Path,
        output: PipelineOutput,
        write: &mut dyn FnMut(PipelineOutput) -> io::Result<()>,
    ) {
        if let Err(err) = write(output) {
            let message = format!("Failed to write output: {err}");
            tracking.log(LogEvent::file(
                Severity::Error,
                LogSource::Output,
                &message,
                path,
            ));
        }
    }

    fn compile_pass(&self, pass: &ResolvedPass) -> Result<PassArtifacts, String> {
        let mut stages = Vec::new();
        for stage in ShaderStage::ALL {
            let entry_point = &pass.stage_entry_points[stage.index()];
            if entry_point.is_empty() {
                continue;
            }
            let artifact = self
                .compiler
                .compile(CompileRequest {
                    entry_point,
                    stage,
                    language: pass.language,
                    code: &pass.code,
                })
                .map_err(|err| format!("Pass '{}': {err}", pass.name))?;
            stages.push(artifact);
        }
        Ok(PassArtifacts { stages })
    }

    fn compile_pipeline_set(&self, set: &ResolvedPipelineSet) -> Result<GraphicsArtifacts, String> {
        let mut artifacts = GraphicsArtifacts::default();
        for config in &set.configurations {
            let mut config_artifacts = ConfigurationArtifacts::default();
            for pass in &config.passes {
                config_artifacts.passes.push(self.compile_pass(pass)?);
            }
            artifacts.configurations.push(config_artifacts);
        }
        Ok(artifacts)
    }

    fn compile_compute_set(&self, compute: &ResolvedComputeSet) -> Result<ComputeArtifacts, String> {
        let stage = self
            .compiler
            .compile(CompileRequest {
                entry_point: &compute.entry_point,
                stage: ShaderStage::Compute,
                language: compute.language,
                code: &compute.code,
            })
            .map_err(|err| format!("Compute set '{}': {err}", compute.name))?;
        Ok(ComputeArtifacts { stage })
    }
}

#[cfg(test)]
mod tests {
    use super::wildcard_match;

    #[test]
    fn wildcard_basics() {
        assert!(wildcard_match("*.pset", "water.pset"));
        assert!(wildcard_match("*.pset", ".pset"));
        assert!(!wildcard_match("*.pset", "water.pset.bak"));
        assert!(wildcard_match("pass?.pset", "pass1.pset"));
        assert!(!wildcard_match("pass?.pset", "pass12.pset"));
        assert!(wildcard_match("*", ""));
        assert!(wildcard_match("a*b*c", "axxbyyc"));
        assert!(!wildcard_match("a*b*c", "axxbyy"));
    }
}
